//! Generic link text check

use super::{violation_at, Rule};
use crate::document::Document;
use crate::domain::violations::{RuleId, Violation};

const GENERIC_MESSAGE: &str =
    "Link text should be descriptive. Avoid generic phrases like 'click here'.";

/// Phrases that make link text non-descriptive
pub const DEFAULT_GENERIC_PHRASES: &[&str] = &["click here", "read more", "learn more", "here", "link"];

/// `href` values exempt from the check, besides in-page fragments
pub const DEFAULT_EXEMPT_HREFS: &[&str] = &["javascript:void(0)"];

/// Flags links whose lower-cased text contains a generic phrase
#[derive(Debug, Clone)]
pub struct LinkTextRule {
    generic_phrases: Vec<String>,
    exempt_hrefs: Vec<String>,
}

impl LinkTextRule {
    pub fn new(generic_phrases: Vec<String>, exempt_hrefs: Vec<String>) -> Self {
        let generic_phrases = generic_phrases.into_iter().map(|p| p.to_lowercase()).collect();
        Self { generic_phrases, exempt_hrefs }
    }

    /// Empty text, fragment links and exempt hrefs are never reported
    fn is_exempt(&self, text: &str, href: &str) -> bool {
        text.is_empty() || href.starts_with('#') || self.exempt_hrefs.iter().any(|h| h == href)
    }
}

impl Default for LinkTextRule {
    fn default() -> Self {
        Self::new(
            DEFAULT_GENERIC_PHRASES.iter().map(|p| p.to_string()).collect(),
            DEFAULT_EXEMPT_HREFS.iter().map(|h| h.to_string()).collect(),
        )
    }
}

impl Rule for LinkTextRule {
    fn name(&self) -> &'static str {
        "Link Text"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::LinkGenericText]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        document
            .find_all("a")
            .into_iter()
            .filter(|link| {
                let text = link.text().to_lowercase();
                let href = link.attr("href").unwrap_or("");

                !self.is_exempt(&text, href)
                    && self.generic_phrases.iter().any(|phrase| text.contains(phrase.as_str()))
            })
            .map(|link| violation_at(RuleId::LinkGenericText, GENERIC_MESSAGE, link))
            .collect()
    }
}
