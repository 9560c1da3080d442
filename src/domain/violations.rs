//! Core domain models for accessibility violations and check results
//!
//! Architecture: Rich Domain Models - Violations are value objects, reports are aggregates
//! - A Violation is fixed at construction; nothing mutates it after it joins a result list
//! - CheckReport acts as an aggregate root over per-document results
//! - Rule identifiers form a closed vocabulary with stable wire names

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Stable identifiers for every rule the checker can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    /// `<html>` missing or without a non-empty `lang`
    DocLangMissing,
    /// `<title>` missing or blank
    DocTitleMissing,
    /// Known low-contrast inline color pair
    ColorContrast,
    /// `<img>` without usable alternative text
    ImgAltMissing,
    /// `<img>` alternative text over the length limit
    ImgAltLength,
    /// `<a>` whose text is a generic phrase
    LinkGenericText,
    /// Heading level skipped relative to the previous heading
    HeadingOrder,
    /// More than one `<h1>` in the document
    HeadingMultipleH1,
}

impl RuleId {
    /// Every rule id, in the order the aggregator reports them
    pub fn all() -> &'static [RuleId] {
        &[
            Self::DocLangMissing,
            Self::DocTitleMissing,
            Self::ColorContrast,
            Self::ImgAltMissing,
            Self::ImgAltLength,
            Self::LinkGenericText,
            Self::HeadingOrder,
            Self::HeadingMultipleH1,
        ]
    }

    /// Wire name, as it appears in `ruleId`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocLangMissing => "DOC_LANG_MISSING",
            Self::DocTitleMissing => "DOC_TITLE_MISSING",
            Self::ColorContrast => "COLOR_CONTRAST",
            Self::ImgAltMissing => "IMG_ALT_MISSING",
            Self::ImgAltLength => "IMG_ALT_LENGTH",
            Self::LinkGenericText => "LINK_GENERIC_TEXT",
            Self::HeadingOrder => "HEADING_ORDER",
            Self::HeadingMultipleH1 => "HEADING_MULTIPLE_H1",
        }
    }

    /// One-line explanation of what triggers this rule
    pub fn description(self) -> &'static str {
        match self {
            Self::DocLangMissing => {
                "The <html> element is missing, or its lang attribute is absent or empty"
            }
            Self::DocTitleMissing => "The document has no <title>, or its text is blank",
            Self::ColorContrast => {
                "An inline style pairs lightgreen and green foreground/background colors"
            }
            Self::ImgAltMissing => "An <img> has no alt attribute, or it is whitespace only",
            Self::ImgAltLength => "An <img> alt text is longer than the configured limit",
            Self::LinkGenericText => {
                "An <a> uses generic text such as 'click here' or 'read more'"
            }
            Self::HeadingOrder => {
                "A heading is more than one level deeper than the heading before it"
            }
            Self::HeadingMultipleH1 => "The document contains more than one <h1>",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = CheckerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| CheckerError::config(format!("Unknown rule id '{s}'")))
    }
}

/// One accessibility defect, localized to a single element
///
/// Serializes to exactly `ruleId`, `message`, `element`, `selector`, `codeSnippet`.
/// Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    rule_id: RuleId,
    message: String,
    element: String,
    selector: String,
    code_snippet: String,
}

impl Violation {
    /// Create a new violation
    pub fn new(
        rule_id: RuleId,
        message: impl Into<String>,
        element: impl Into<String>,
        selector: impl Into<String>,
        code_snippet: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            message: message.into(),
            element: element.into(),
            selector: selector.into(),
            code_snippet: code_snippet.into(),
        }
    }

    pub fn rule_id(&self) -> RuleId {
        self.rule_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Tag name of the offending element
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Serialized markup of the offending element, or a placeholder tag
    pub fn code_snippet(&self) -> &str {
        &self.code_snippet
    }
}

/// Request body accepted by the HTTP endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub html: String,
}

/// Response body produced for a single checked document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub violations: Vec<Violation>,
}

/// Violations found in one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Where the document came from (file path, or `-` for stdin)
    pub source: PathBuf,
    /// Aggregated violations in rule order
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    pub fn new(source: impl Into<PathBuf>, violations: Vec<Violation>) -> Self {
        Self { source: source.into(), violations }
    }
}

/// Summary statistics for a check report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Number of documents checked
    pub total_documents: usize,
    /// Total number of violations across all documents
    pub total_violations: usize,
    /// Number of violations per rule
    pub violations_by_rule: BTreeMap<RuleId, usize>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when the check was performed
    pub checked_at: DateTime<Utc>,
}

impl CheckSummary {
    fn record(&mut self, violation: &Violation) {
        self.total_violations += 1;
        *self.violations_by_rule.entry(violation.rule_id()).or_insert(0) += 1;
    }

    /// Count for a single rule
    pub fn count(&self, rule_id: RuleId) -> usize {
        self.violations_by_rule.get(&rule_id).copied().unwrap_or(0)
    }
}

/// Complete result of checking one or more documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Per-document results
    pub documents: Vec<DocumentReport>,
    /// Summary statistics
    pub summary: CheckSummary,
    /// Configuration used for this check
    pub config_fingerprint: Option<String>,
}

impl CheckReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            summary: CheckSummary { checked_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Add a checked document to the report
    pub fn add_document(&mut self, document: DocumentReport) {
        for violation in &document.violations {
            self.summary.record(violation);
        }
        self.summary.total_documents += 1;
        self.documents.push(document);
    }

    /// Whether any document produced a violation
    pub fn has_violations(&self) -> bool {
        self.summary.total_violations > 0
    }

    /// All violations, paired with their source, in report order
    pub fn violations(&self) -> impl Iterator<Item = (&PathBuf, &Violation)> {
        self.documents
            .iter()
            .flat_map(|doc| doc.violations.iter().map(move |v| (&doc.source, v)))
    }

    /// Violations of a single rule
    pub fn violations_for_rule(&self, rule_id: RuleId) -> impl Iterator<Item = &Violation> {
        self.violations().map(|(_, v)| v).filter(move |v| v.rule_id() == rule_id)
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Order documents by source path. Violations inside a document keep rule order.
    pub fn sort_documents(&mut self) {
        self.documents.sort_by(|a, b| a.source.cmp(&b.source));
    }
}

impl Default for CheckReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types that can occur while checking documents
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// Input could not be turned into a document tree at all
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A specific document could not be checked
    #[error("Document error in {path}: {message}")]
    Document { path: String, message: String },

    /// HTTP service failed to start or serve
    #[error("Server error: {message}")]
    Server { message: String },
}

impl CheckerError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a document error
    pub fn document(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Document { path: path.into(), message: message.into() }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server { message: message.into() }
    }

    /// Whether this error came from the parse stage
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Result type for checker operations
pub type CheckerResult<T> = Result<T, CheckerError>;
