//! Main analysis orchestrator for the accessibility checker
//!
//! Architecture: Domain Services - Analyzer orchestrates rule evaluation workflows
//! - Runs the rule checks in a fixed order and concatenates their findings
//! - Resolves files and directory trees into documents through the path filter
//! - Checks many documents in parallel; each worker parses its own tree

pub mod path_filter;

pub use path_filter::PathFilter;

use crate::config::CheckerConfig;
use crate::document::{parse_bytes, Document, ParseLimits};
use crate::domain::violations::{
    CheckReport, CheckerError, CheckerResult, DocumentReport, RuleId, Violation,
};
use crate::rules::{builtin_rules, builtin_rules_with, Rule};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Run every built-in check with default settings, in aggregation order
///
/// The result is the concatenation of the per-rule results: document language,
/// title, color contrast, image alt text, link text, heading order, single h1.
pub fn check_accessibility(document: &Document) -> Vec<Violation> {
    builtin_rules().iter().flat_map(|rule| rule.check(document)).collect()
}

/// Main analyzer that applies a configured rule set to documents
pub struct Analyzer {
    /// Configuration for this analysis
    config: CheckerConfig,
    /// Checks in aggregation order
    rules: Vec<Box<dyn Rule>>,
    /// Path filter for directory scans
    path_filter: PathFilter,
    /// Limits applied before parsing
    limits: ParseLimits,
}

/// Options for customizing multi-document analysis
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Maximum number of documents to check
    pub max_documents: Option<usize>,
    /// Stop at the first document that cannot be read or parsed
    pub fail_fast: bool,
    /// Additional exclude patterns for this run
    pub exclude_patterns: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { parallel: true, max_documents: None, fail_fast: false, exclude_patterns: Vec::new() }
    }
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: CheckerConfig) -> CheckerResult<Self> {
        config.validate()?;

        let rules = builtin_rules_with(&config);

        let path_filter = PathFilter::new(
            config.paths.patterns.clone(),
            config.paths.extensions.clone(),
            config.paths.ignore_file.clone(),
        )
        .map_err(|e| CheckerError::config(format!("Failed to create path filter: {e}")))?;

        let limits = config.parse_limits();

        Ok(Self { config, rules, path_filter, limits })
    }

    /// Create an analyzer with default configuration
    pub fn with_defaults() -> CheckerResult<Self> {
        Self::new(CheckerConfig::default())
    }

    /// Configuration this analyzer was built from
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the enabled checks against a parsed document
    pub fn check_accessibility(&self, document: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !rule.rule_ids().iter().any(|id| self.config.is_rule_enabled(*id)) {
                tracing::trace!("Skipping disabled check '{}'", rule.name());
                continue;
            }

            let before = violations.len();
            violations.extend(
                rule.check(document)
                    .into_iter()
                    .filter(|v| self.config.is_rule_enabled(v.rule_id())),
            );
            tracing::debug!(
                "Check '{}' reported {} violations",
                rule.name(),
                violations.len() - before
            );
        }

        violations
    }

    /// Parse and check HTML text
    pub fn analyze_html(&self, html: &str) -> CheckerResult<Vec<Violation>> {
        let document = Document::parse_with_limits(html, &self.limits)?;
        Ok(self.check_accessibility(&document))
    }

    /// Parse and check raw bytes
    pub fn analyze_bytes(&self, bytes: &[u8]) -> CheckerResult<Vec<Violation>> {
        let document = parse_bytes(bytes, &self.limits)?;
        Ok(self.check_accessibility(&document))
    }

    /// Read, parse and check a single file
    pub fn analyze_file<P: AsRef<Path>>(&self, file_path: P) -> CheckerResult<DocumentReport> {
        let file_path = file_path.as_ref();

        let bytes = fs::read(file_path).map_err(|e| {
            CheckerError::document(
                file_path.display().to_string(),
                format!("Failed to read file: {e}"),
            )
        })?;

        let violations = self
            .analyze_bytes(&bytes)
            .map_err(|e| CheckerError::document(file_path.display().to_string(), e.to_string()))?;

        Ok(DocumentReport::new(file_path, violations))
    }

    /// Check files and directory trees and return a complete report
    pub fn analyze_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> CheckerResult<CheckReport> {
        let start_time = Instant::now();
        let mut report = CheckReport::new();

        let mut path_filter = self.path_filter.clone();
        for pattern in &options.exclude_patterns {
            path_filter.add_pattern(pattern)?;
        }

        // Files named explicitly are always checked; only directory walks are filtered
        let mut files_to_check = Vec::new();
        for path in paths {
            let path = path.as_ref();

            if path.is_file() {
                files_to_check.push(path.to_path_buf());
            } else if path.is_dir() {
                files_to_check.extend(path_filter.find_files(path)?);
            } else if options.fail_fast {
                return Err(CheckerError::document(
                    path.display().to_string(),
                    "Path does not exist",
                ));
            } else {
                tracing::warn!("Skipping {}: path does not exist", path.display());
            }
        }

        if let Some(max_documents) = options.max_documents {
            files_to_check.truncate(max_documents);
        }

        tracing::info!("Checking {} documents", files_to_check.len());

        let documents = if options.parallel && files_to_check.len() > 1 {
            self.analyze_files_parallel(&files_to_check, options)?
        } else {
            self.analyze_files_sequential(&files_to_check, options)?
        };

        for document in documents {
            report.add_document(document);
        }

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.config.fingerprint());
        report.sort_documents();

        Ok(report)
    }

    /// Check a directory tree
    pub fn analyze_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> CheckerResult<CheckReport> {
        self.analyze_paths(&[root.as_ref()], options)
    }

    fn analyze_files_sequential(
        &self,
        files: &[PathBuf],
        options: &AnalysisOptions,
    ) -> CheckerResult<Vec<DocumentReport>> {
        let mut documents = Vec::new();

        for file_path in files {
            match self.analyze_file(file_path) {
                Ok(document) => documents.push(document),
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => tracing::warn!("Failed to check {}: {}", file_path.display(), e),
            }
        }

        Ok(documents)
    }

    fn analyze_files_parallel(
        &self,
        files: &[PathBuf],
        options: &AnalysisOptions,
    ) -> CheckerResult<Vec<DocumentReport>> {
        let results: Vec<(&PathBuf, CheckerResult<DocumentReport>)> =
            files.par_iter().map(|file_path| (file_path, self.analyze_file(file_path))).collect();

        let mut documents = Vec::with_capacity(results.len());
        for (file_path, result) in results {
            match result {
                Ok(document) => documents.push(document),
                Err(e) if options.fail_fast => return Err(e),
                Err(e) => tracing::warn!("Failed to check {}: {}", file_path.display(), e),
            }
        }

        Ok(documents)
    }

    /// Get configuration fingerprint
    pub fn config_fingerprint(&self) -> String {
        self.config.fingerprint()
    }

    /// Statistics about the configured rules
    pub fn rule_stats(&self) -> RuleStats {
        let enabled = self.config.enabled_rules().count();
        RuleStats {
            checks: self.rules.len(),
            enabled_rules: enabled,
            disabled_rules: RuleId::all().len() - enabled,
        }
    }
}

/// Statistics about configured rules
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuleStats {
    /// Number of checks in the pipeline
    pub checks: usize,
    pub enabled_rules: usize,
    pub disabled_rules: usize,
}

impl RuleStats {
    pub fn total_rules(&self) -> usize {
        self.enabled_rules + self.disabled_rules
    }
}
