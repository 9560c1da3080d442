//! Configuration loading and management for the accessibility checker
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - Defaults reproduce the fixed rule set; a loaded configuration is never mutated
//! - Path filters, parse limits and service settings live alongside the rule table

use crate::analyzer::path_filter::DEFAULT_IGNORE_FILE;
use crate::document::{ParseLimits, DEFAULT_MAX_DOCUMENT_BYTES};
use crate::domain::violations::{CheckerError, CheckerResult, RuleId};
use crate::rules::images::DEFAULT_MAX_ALT_LENGTH;
use crate::rules::links::{DEFAULT_EXEMPT_HREFS, DEFAULT_GENERIC_PHRASES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Configuration file names looked up in the working directory
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["ada_checker.yaml", "ada_checker.yml", ".ada_checker.yaml"];

/// Main configuration structure for the checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Configuration format version
    pub version: String,
    /// Input size limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Per-rule switches
    #[serde(default = "default_rule_settings")]
    pub rules: Vec<RuleSetting>,
    /// Image alt text settings
    #[serde(default)]
    pub images: ImageConfig,
    /// Link text settings
    #[serde(default)]
    pub links: LinkConfig,
    /// Path filtering for directory scans
    #[serde(default)]
    pub paths: PathConfig,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Limits applied before parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Documents larger than this are rejected with a parse error
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

/// Enable or disable a single rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetting {
    pub id: RuleId,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Image alt text settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Longest accepted alt text, in characters
    #[serde(default = "default_max_alt_length")]
    pub max_alt_length: usize,
}

/// Link text settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Phrases that make link text generic (matched as substrings)
    #[serde(default = "default_generic_phrases")]
    pub generic_phrases: Vec<String>,
    /// `href` values never reported, besides fragments
    #[serde(default = "default_exempt_hrefs")]
    pub exempt_hrefs: Vec<String>,
}

/// Path filtering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Include/exclude patterns (gitignore-style)
    #[serde(default = "default_path_patterns")]
    pub patterns: Vec<String>,
    /// File extensions treated as HTML documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Optional ignore file name
    #[serde(default = "default_ignore_file")]
    pub ignore_file: Option<String>,
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed to call the API from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Deadline for a single check, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl CheckerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CheckerResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            CheckerError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            CheckerError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> CheckerResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CheckerError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the first default config file found in `dir`, or the built-in defaults
    pub fn discover<P: AsRef<Path>>(dir: P) -> CheckerResult<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                tracing::debug!("Loading configuration from {}", candidate.display());
                return Self::load_from_file(candidate);
            }
        }
        Ok(Self::default())
    }

    /// Get default configuration with every rule enabled
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            limits: LimitsConfig::default(),
            rules: default_rule_settings(),
            images: ImageConfig::default(),
            links: LinkConfig::default(),
            paths: PathConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> CheckerResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(CheckerError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        for setting in &self.rules {
            let duplicate_count = self.rules.iter().filter(|r| r.id == setting.id).count();
            if duplicate_count > 1 {
                return Err(CheckerError::config(format!(
                    "Duplicate rule setting for '{}'",
                    setting.id
                )));
            }
        }

        if self.limits.max_document_bytes == 0 {
            return Err(CheckerError::config("limits.max_document_bytes must be positive"));
        }

        if self.images.max_alt_length == 0 {
            return Err(CheckerError::config("images.max_alt_length must be positive"));
        }

        if let Some(phrase) = self.links.generic_phrases.iter().find(|p| p.trim().is_empty()) {
            return Err(CheckerError::config(format!(
                "links.generic_phrases contains an empty phrase: '{phrase}'"
            )));
        }

        for pattern in &self.paths.patterns {
            let raw = pattern.strip_prefix('!').unwrap_or(pattern);
            glob::Pattern::new(raw).map_err(|e| {
                CheckerError::config(format!("Invalid path pattern '{pattern}': {e}"))
            })?;
        }

        if self.paths.extensions.is_empty() {
            return Err(CheckerError::config("paths.extensions must not be empty"));
        }

        self.server.bind.parse::<SocketAddr>().map_err(|e| {
            CheckerError::config(format!("Invalid server.bind '{}': {}", self.server.bind, e))
        })?;

        if self.server.request_timeout_ms == 0 {
            return Err(CheckerError::config("server.request_timeout_ms must be positive"));
        }

        Ok(())
    }

    /// Whether a rule is enabled; rules not listed are enabled
    pub fn is_rule_enabled(&self, rule_id: RuleId) -> bool {
        self.rules.iter().find(|r| r.id == rule_id).map_or(true, |r| r.enabled)
    }

    /// Enabled rule ids in aggregation order
    pub fn enabled_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        RuleId::all().iter().copied().filter(move |id| self.is_rule_enabled(*id))
    }

    /// Parse limits derived from this configuration
    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits { max_document_bytes: self.limits.max_document_bytes }
    }

    /// Convert to JSON for serialization
    pub fn to_json(&self) -> CheckerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckerError::config(format!("Failed to serialize config: {e}")))
    }

    /// Convert to YAML, the on-disk format
    pub fn to_yaml(&self) -> CheckerResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| CheckerError::config(format!("Failed to serialize config: {e}")))
    }

    /// Create a fingerprint of the configuration
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.version.hash(&mut hasher);
        self.limits.max_document_bytes.hash(&mut hasher);

        // Rule switches are hashed in aggregation order so listing order is irrelevant
        for id in RuleId::all() {
            id.hash(&mut hasher);
            self.is_rule_enabled(*id).hash(&mut hasher);
        }

        self.images.max_alt_length.hash(&mut hasher);
        self.links.generic_phrases.hash(&mut hasher);
        self.links.exempt_hrefs.hash(&mut hasher);
        self.paths.patterns.hash(&mut hasher);
        self.paths.extensions.hash(&mut hasher);
        self.paths.ignore_file.hash(&mut hasher);

        format!("{:x}", hasher.finish())
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_document_bytes: default_max_document_bytes() }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { max_alt_length: default_max_alt_length() }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { generic_phrases: default_generic_phrases(), exempt_hrefs: default_exempt_hrefs() }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            patterns: default_path_patterns(),
            extensions: default_extensions(),
            ignore_file: default_ignore_file(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
            request_timeout_ms: default_request_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rule_settings() -> Vec<RuleSetting> {
    RuleId::all().iter().map(|id| RuleSetting { id: *id, enabled: true }).collect()
}

fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

fn default_max_alt_length() -> usize {
    DEFAULT_MAX_ALT_LENGTH
}

fn default_generic_phrases() -> Vec<String> {
    DEFAULT_GENERIC_PHRASES.iter().map(|p| p.to_string()).collect()
}

fn default_exempt_hrefs() -> Vec<String> {
    DEFAULT_EXEMPT_HREFS.iter().map(|h| h.to_string()).collect()
}

fn default_path_patterns() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/dist/**".to_string(),
        "**/build/**".to_string(),
    ]
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string()]
}

fn default_ignore_file() -> Option<String> {
    Some(DEFAULT_IGNORE_FILE.to_string())
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string(), "http://127.0.0.1:3000".to_string()]
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_body_bytes() -> usize {
    // JSON escaping can roughly double the size of the embedded document
    2 * DEFAULT_MAX_DOCUMENT_BYTES
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: CheckerConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: CheckerConfig::default() }
    }

    /// Turn a rule on or off
    pub fn rule(mut self, rule_id: RuleId, enabled: bool) -> Self {
        match self.config.rules.iter_mut().find(|r| r.id == rule_id) {
            Some(setting) => setting.enabled = enabled,
            None => self.config.rules.push(RuleSetting { id: rule_id, enabled }),
        }
        self
    }

    /// Set the maximum accepted document size
    pub fn max_document_bytes(mut self, bytes: usize) -> Self {
        self.config.limits.max_document_bytes = bytes;
        self
    }

    /// Set the alt text length limit
    pub fn max_alt_length(mut self, length: usize) -> Self {
        self.config.images.max_alt_length = length;
        self
    }

    /// Add a generic link phrase
    pub fn add_generic_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.config.links.generic_phrases.push(phrase.into());
        self
    }

    /// Add a path pattern
    pub fn add_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.patterns.push(pattern.into());
        self
    }

    /// Set the address the HTTP service binds to
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.server.bind = addr.into();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CheckerResult<CheckerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = CheckerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.enabled_rules().collect::<Vec<_>>(), RuleId::all());
        assert_eq!(config.images.max_alt_length, 120);
        assert_eq!(config.links.generic_phrases.len(), 5);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
version: "1.0"
rules:
  - id: COLOR_CONTRAST
    enabled: false
images:
  max_alt_length: 80
"#;
        let config = CheckerConfig::load_from_str(yaml).unwrap();

        assert!(!config.is_rule_enabled(RuleId::ColorContrast));
        assert!(config.is_rule_enabled(RuleId::DocLangMissing));
        assert_eq!(config.images.max_alt_length, 80);
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.paths.extensions, vec!["html", "htm"]);
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let err = CheckerConfig::load_from_str("version: \"2.0\"").unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration version"));
    }

    #[test]
    fn test_rejects_duplicate_rule_settings() {
        let yaml = r#"
version: "1.0"
rules:
  - id: HEADING_ORDER
  - id: HEADING_ORDER
    enabled: false
"#;
        assert!(CheckerConfig::load_from_str(yaml).is_err());
    }

    #[test]
    fn test_rejects_unknown_rule_id() {
        let yaml = "version: \"1.0\"\nrules:\n  - id: NOT_A_RULE\n";
        assert!(CheckerConfig::load_from_str(yaml).is_err());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(ConfigBuilder::new().max_alt_length(0).build().is_err());
        assert!(ConfigBuilder::new().max_document_bytes(0).build().is_err());
        assert!(ConfigBuilder::new().bind("not an address").build().is_err());
        assert!(ConfigBuilder::new().add_path_pattern("[invalid").build().is_err());
        assert!(ConfigBuilder::new().add_generic_phrase("  ").build().is_err());
    }

    #[test]
    fn test_builder_toggles_rules() {
        let config = ConfigBuilder::new()
            .rule(RuleId::ImgAltLength, false)
            .max_alt_length(64)
            .build()
            .unwrap();

        assert!(!config.is_rule_enabled(RuleId::ImgAltLength));
        assert!(config.is_rule_enabled(RuleId::ImgAltMissing));
        assert_eq!(config.parse_limits().max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn test_json_export_shows_effective_settings() {
        let config = ConfigBuilder::new().rule(RuleId::ColorContrast, false).build().unwrap();
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(json["images"]["max_alt_length"], 120);
        assert_eq!(json["paths"]["ignore_file"], DEFAULT_IGNORE_FILE);
        assert!(json["rules"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["id"] == "COLOR_CONTRAST" && r["enabled"] == false));
    }

    #[test]
    fn test_fingerprint_tracks_rule_switches() {
        let base = CheckerConfig::default();
        let changed = ConfigBuilder::new().rule(RuleId::HeadingOrder, false).build().unwrap();

        assert_eq!(base.fingerprint(), CheckerConfig::default().fingerprint());
        assert_ne!(base.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_yaml_round_trip_and_file_loading() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ada_checker.yaml");
        let config = ConfigBuilder::new().max_alt_length(99).build().unwrap();
        fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = CheckerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.images.max_alt_length, 99);
        assert_eq!(loaded.fingerprint(), config.fingerprint());

        let discovered = CheckerConfig::discover(temp_dir.path()).unwrap();
        assert_eq!(discovered.images.max_alt_length, 99);
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = CheckerConfig::discover(temp_dir.path()).unwrap();

        assert_eq!(config.fingerprint(), CheckerConfig::default().fingerprint());
    }
}
