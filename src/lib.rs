//! ADA Checker - HTML accessibility compliance checking
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Parsing, rule checks and aggregation are pure functions of the document text
//! - Configuration, file discovery and reporting sit around that core
//! - The HTTP endpoint is an optional adapter over the same checker
//!
//! ```no_run
//! let violations = ada_checker::check_html("<html><body><img src=\"x.png\"></body></html>")?;
//! assert_eq!(violations.len(), 3);
//! # Ok::<(), ada_checker::CheckerError>(())
//! ```

pub mod analyzer;
pub mod config;
pub mod document;
pub mod domain;
pub mod report;
pub mod rules;
#[cfg(feature = "server")]
pub mod server;

// Re-export main types for convenient access
pub use domain::violations::{
    CheckReport, CheckRequest, CheckResponse, CheckSummary, CheckerError, CheckerResult,
    DocumentReport, RuleId, Violation,
};

pub use config::{CheckerConfig, ConfigBuilder};

pub use document::{parse, parse_bytes, Document, Element, ParseLimits};

pub use analyzer::{check_accessibility, AnalysisOptions, Analyzer, PathFilter, RuleStats};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use rules::Rule;

use std::path::Path;

/// Parse HTML text and run every built-in check with default settings
pub fn check_html(html: &str) -> CheckerResult<Vec<Violation>> {
    Ok(check_accessibility(&parse(html)?))
}

/// Main checker providing high-level operations over a fixed configuration
pub struct AccessibilityChecker {
    analyzer: Analyzer,
    report_formatter: ReportFormatter,
}

impl AccessibilityChecker {
    /// Create a new checker with the given configuration
    pub fn new_with_config(config: CheckerConfig) -> CheckerResult<Self> {
        let analyzer = Analyzer::new(config)?;
        Ok(Self { analyzer, report_formatter: ReportFormatter::default() })
    }

    /// Create a checker with default configuration
    pub fn new() -> CheckerResult<Self> {
        Self::new_with_config(CheckerConfig::default())
    }

    /// Create a checker loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> CheckerResult<Self> {
        Self::new_with_config(CheckerConfig::load_from_file(path)?)
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// Parse and check HTML text
    pub fn check_html(&self, html: &str) -> CheckerResult<Vec<Violation>> {
        self.analyzer.analyze_html(html)
    }

    /// Parse and check raw bytes, rejecting anything that is not UTF-8 text
    pub fn check_bytes(&self, bytes: &[u8]) -> CheckerResult<Vec<Violation>> {
        self.analyzer.analyze_bytes(bytes)
    }

    /// Check an already parsed document
    pub fn check_document(&self, document: &Document) -> Vec<Violation> {
        self.analyzer.check_accessibility(document)
    }

    /// Check a single file
    pub fn check_file<P: AsRef<Path>>(&self, path: P) -> CheckerResult<DocumentReport> {
        self.analyzer.analyze_file(path)
    }

    /// Check files and directory trees
    pub fn check_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> CheckerResult<CheckReport> {
        self.analyzer.analyze_paths(paths, options)
    }

    /// Format a report using the configured formatter
    pub fn format_report(&self, report: &CheckReport, format: OutputFormat) -> CheckerResult<String> {
        self.report_formatter.format_report(report, format)
    }

    /// Render one document's violations as `{"violations": [...]}`
    pub fn format_response(&self, violations: &[Violation]) -> CheckerResult<String> {
        self.report_formatter.format_response(violations)
    }

    /// Statistics about the configured rules
    pub fn rule_statistics(&self) -> RuleStats {
        self.analyzer.rule_stats()
    }

    /// Configuration this checker was built from
    pub fn config(&self) -> &CheckerConfig {
        self.analyzer.config()
    }

    /// Consume the checker, keeping the analyzer
    pub fn into_analyzer(self) -> Analyzer {
        self.analyzer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_html_convenience() {
        let violations = check_html("<html><body><img src=\"x.png\"></body></html>").unwrap();
        let ids: Vec<_> = violations.iter().map(|v| v.rule_id()).collect();

        assert_eq!(ids, vec![RuleId::DocLangMissing, RuleId::DocTitleMissing, RuleId::ImgAltMissing]);
    }

    #[test]
    fn test_checker_uses_configuration() {
        let config = ConfigBuilder::new().rule(RuleId::DocLangMissing, false).build().unwrap();
        let checker = AccessibilityChecker::new_with_config(config).unwrap();

        let violations = checker.check_html("<title>x</title><h1>a</h1>").unwrap();
        assert!(violations.is_empty());
        assert_eq!(checker.rule_statistics().disabled_rules, 1);
    }

    #[test]
    fn test_checker_with_files() -> CheckerResult<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("page.html");
        fs::write(&file, "<html lang=\"en\"><title>T</title><a href=\"/x\">here</a></html>")?;

        let checker = AccessibilityChecker::new()?;
        let document = checker.check_file(&file)?;
        assert_eq!(document.violations.len(), 1);
        assert_eq!(document.violations[0].rule_id(), RuleId::LinkGenericText);

        let report = checker.check_paths(&[temp_dir.path()], &AnalysisOptions::default())?;
        let formatted = checker.format_report(&report, OutputFormat::GitHub)?;
        assert!(formatted.contains("title=LINK_GENERIC_TEXT"));

        Ok(())
    }

    #[test]
    fn test_config_file_loading() -> CheckerResult<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("ada_checker.yaml");
        fs::write(&path, "version: \"1.0\"\nimages:\n  max_alt_length: 3\n")?;

        let checker = AccessibilityChecker::from_config_file(&path)?;
        let violations = checker.check_html("<img src=\"a.png\" alt=\"long\">")?;

        assert!(violations.iter().any(|v| v.rule_id() == RuleId::ImgAltLength));
        Ok(())
    }
}
