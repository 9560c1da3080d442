//! Report generation with multiple output formats
//!
//! Architecture: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - CheckReport (domain) is converted to terminal, JSON, JUnit, SARIF and GitHub output
//! - Violations serialize with their wire field names in every JSON-based format
//! - Filtering and truncation happen once, before any format is rendered

use crate::domain::violations::{
    CheckReport, CheckResponse, CheckerError, CheckerResult, RuleId, Violation,
};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::str::FromStr;

/// Longest snippet preview shown in terminal output, in characters
const SNIPPET_PREVIEW_CHARS: usize = 100;

/// Supported output formats for check reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and snippets
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI/CD integration
    Junit,
    /// SARIF format for code scanning tools
    Sarif,
    /// GitHub Actions workflow commands
    GitHub,
}

impl OutputFormat {
    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit", "sarif", "github"]
    }
}

impl FromStr for OutputFormat {
    type Err = CheckerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "junit" => Ok(Self::Junit),
            "sarif" => Ok(Self::Sarif),
            "github" => Ok(Self::GitHub),
            other => Err(CheckerError::config(format!(
                "Unknown output format '{other}'. Available: {}",
                Self::all_formats().join(", ")
            ))),
        }
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to show the offending markup under each violation
    pub show_snippets: bool,
    /// Maximum number of violations to include
    pub max_violations: Option<usize>,
    /// Only include these rules
    pub rules: Option<Vec<RuleId>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_snippets: true, max_violations: None, rules: None }
    }
}

/// Violations selected for output, grouped by document in report order
struct Selection<'a> {
    documents: Vec<(&'a Path, Vec<&'a Violation>)>,
}

impl<'a> Selection<'a> {
    fn total(&self) -> usize {
        self.documents.iter().map(|(_, v)| v.len()).sum()
    }

    fn with_violations(&self) -> impl Iterator<Item = &(&'a Path, Vec<&'a Violation>)> + '_ {
        self.documents.iter().filter(|(_, v)| !v.is_empty())
    }
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a check report in the specified format
    pub fn format_report(&self, report: &CheckReport, format: OutputFormat) -> CheckerResult<String> {
        let selection = self.select(report);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &selection)),
            OutputFormat::Json => self.format_json(report, &selection),
            OutputFormat::Junit => Ok(self.format_junit(report, &selection)),
            OutputFormat::Sarif => self.format_sarif(&selection),
            OutputFormat::GitHub => Ok(self.format_github(&selection)),
        }
    }

    /// Render a single document's violations in the service response shape
    pub fn format_response(&self, violations: &[Violation]) -> CheckerResult<String> {
        let selected: Vec<Violation> = violations
            .iter()
            .filter(|v| self.options.rules.as_ref().map_or(true, |r| r.contains(&v.rule_id())))
            .take(self.options.max_violations.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        serde_json::to_string_pretty(&CheckResponse { violations: selected })
            .map_err(|e| CheckerError::config(format!("JSON serialization failed: {e}")))
    }

    fn select<'a>(&self, report: &'a CheckReport) -> Selection<'a> {
        let mut remaining = self.options.max_violations.unwrap_or(usize::MAX);
        let mut documents = Vec::with_capacity(report.documents.len());

        for document in &report.documents {
            let violations: Vec<&Violation> = document
                .violations
                .iter()
                .filter(|v| self.options.rules.as_ref().map_or(true, |r| r.contains(&v.rule_id())))
                .take(remaining)
                .collect();
            remaining -= violations.len();
            documents.push((document.source.as_path(), violations));
        }

        Selection { documents }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn format_human(&self, report: &CheckReport, selection: &Selection<'_>) -> String {
        let mut output = String::new();

        if selection.total() == 0 {
            output.push_str(&format!("✅ {}\n", self.paint("32", "No accessibility violations found")));
        } else {
            output.push_str(&format!("❌ {}\n\n", self.paint("31", "Accessibility Violations Found")));

            for (source, violations) in selection.with_violations() {
                output.push_str(&format!("📁 {}\n", source.display()));

                for violation in violations {
                    output.push_str(&format!(
                        "  {} [{}] {}\n",
                        self.paint("2", violation.selector()),
                        self.paint("31", violation.rule_id().as_str()),
                        violation.message()
                    ));

                    if self.options.show_snippets {
                        let preview = snippet_preview(violation.code_snippet());
                        output.push_str(&format!("    {}\n", self.paint("2", &format!("│ {preview}"))));
                    }
                }
                output.push('\n');
            }
        }

        output.push_str(&self.format_summary(report));
        output
    }

    fn format_summary(&self, report: &CheckReport) -> String {
        let summary = &report.summary;
        let seconds = (summary.execution_time_ms as f64) / 1000.0;
        let documents = plural(summary.total_documents, "document");

        let mut output = format!("📊 {} ", self.paint("1", "Summary:"));
        if summary.total_violations == 0 {
            output.push_str(&format!(
                "{} in {documents} ({seconds:.1}s)\n",
                self.paint("32", "0 violations")
            ));
            return output;
        }

        output.push_str(&format!(
            "{} in {documents} ({seconds:.1}s)\n",
            self.paint("31", &plural(summary.total_violations, "violation"))
        ));
        for (rule_id, count) in &summary.violations_by_rule {
            output.push_str(&format!("   {rule_id}: {count}\n"));
        }
        output
    }

    fn format_json(&self, report: &CheckReport, selection: &Selection<'_>) -> CheckerResult<String> {
        let documents: Vec<JsonValue> = selection
            .documents
            .iter()
            .map(|(source, violations)| {
                serde_json::json!({
                    "source": source.display().to_string(),
                    "violations": violations,
                })
            })
            .collect();

        let json_report = serde_json::json!({
            "documents": documents,
            "summary": {
                "total_documents": report.summary.total_documents,
                "total_violations": report.summary.total_violations,
                "violations_by_rule": report.summary.violations_by_rule,
                "execution_time_ms": report.summary.execution_time_ms,
                "checked_at": report.summary.checked_at.to_rfc3339(),
            },
            "config_fingerprint": report.config_fingerprint,
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| CheckerError::config(format!("JSON serialization failed: {e}")))
    }

    fn format_junit(&self, report: &CheckReport, selection: &Selection<'_>) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let clean = selection.documents.iter().filter(|(_, v)| v.is_empty()).count();
        let failures = selection.total();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"ada-checker\" tests=\"{}\" failures=\"{}\" errors=\"0\" time=\"{:.3}\">\n",
            clean + failures,
            failures,
            execution_time
        ));

        for (source, violations) in &selection.documents {
            let source = escape_xml(&source.display().to_string());

            if violations.is_empty() {
                xml.push_str(&format!(
                    "  <testcase classname=\"accessibility\" name=\"{source}\"/>\n"
                ));
                continue;
            }

            for violation in violations {
                xml.push_str(&format!(
                    "  <testcase classname=\"{}\" name=\"{} {}\">\n",
                    violation.rule_id(),
                    source,
                    escape_xml(violation.selector())
                ));
                xml.push_str(&format!(
                    "    <failure message=\"{}\">\n",
                    escape_xml(violation.message())
                ));
                xml.push_str(&format!("      Selector: {}\n", escape_xml(violation.selector())));
                xml.push_str(&format!("      Snippet: {}\n", escape_xml(violation.code_snippet())));
                xml.push_str("    </failure>\n");
                xml.push_str("  </testcase>\n");
            }
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    fn format_sarif(&self, selection: &Selection<'_>) -> CheckerResult<String> {
        let rules: Vec<JsonValue> = RuleId::all()
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id.as_str(),
                    "shortDescription": { "text": id.description() }
                })
            })
            .collect();

        let results: Vec<JsonValue> = selection
            .with_violations()
            .flat_map(|(source, violations)| {
                violations.iter().map(move |v| {
                    serde_json::json!({
                        "ruleId": v.rule_id().as_str(),
                        "level": "error",
                        "message": { "text": v.message() },
                        "locations": [{
                            "physicalLocation": {
                                "artifactLocation": { "uri": source.display().to_string() },
                                "region": { "snippet": { "text": v.code_snippet() } }
                            },
                            "logicalLocations": [{
                                "fullyQualifiedName": v.selector(),
                                "kind": "element"
                            }]
                        }]
                    })
                })
            })
            .collect();

        let sarif_report = serde_json::json!({
            "version": "2.1.0",
            "$schema": "https://json.schemastore.org/sarif-2.1.0.json",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "ada-checker",
                        "version": env!("CARGO_PKG_VERSION"),
                        "rules": rules
                    }
                },
                "results": results
            }]
        });

        serde_json::to_string_pretty(&sarif_report)
            .map_err(|e| CheckerError::config(format!("SARIF serialization failed: {e}")))
    }

    fn format_github(&self, selection: &Selection<'_>) -> String {
        let mut output = String::new();

        for (source, violations) in selection.with_violations() {
            for violation in violations {
                output.push_str(&format!(
                    "::error file={},title={}::{}\n",
                    escape_github_property(&source.display().to_string()),
                    violation.rule_id(),
                    escape_github_data(&format!("{} ({})", violation.message(), violation.selector()))
                ));
            }
        }

        output
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

/// First line of a snippet, shortened for terminal display
fn snippet_preview(snippet: &str) -> String {
    let first_line = snippet.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > SNIPPET_PREVIEW_CHARS {
        let truncated: String = first_line.chars().take(SNIPPET_PREVIEW_CHARS).collect();
        format!("{truncated}…")
    } else if snippet.lines().nth(1).is_some() {
        format!("{first_line} …")
    } else {
        first_line.to_string()
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_github_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_github_property(s: &str) -> String {
    escape_github_data(s).replace(':', "%3A").replace(',', "%2C")
}
