//! Accessibility rule checks
//!
//! Each check is a stateless pass over a parsed [`Document`] that reports zero or
//! more violations in document order. Checks only read the tree; a missing
//! attribute is treated as absent, never as a fault, so no check can fail.

pub mod contrast;
pub mod document;
pub mod headings;
pub mod images;
pub mod links;

use crate::config::CheckerConfig;
use crate::document::{selector_for, Document, Element};
use crate::domain::violations::{RuleId, Violation};

pub use contrast::ColorContrastRule;
pub use document::{DocLangRule, DocTitleRule};
pub use headings::{HeadingOrderRule, MultipleH1Rule};
pub use images::ImageAltRule;
pub use links::LinkTextRule;

/// Trait implemented by all rule checks
pub trait Rule: Send + Sync {
    /// Human-readable name of this check
    fn name(&self) -> &'static str;

    /// Rule ids this check can emit
    fn rule_ids(&self) -> &'static [RuleId];

    /// Inspect the document and return violations in document order
    fn check(&self, document: &Document) -> Vec<Violation>;
}

/// The seven checks with their default settings, in aggregation order
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    builtin_rules_with(&CheckerConfig::default())
}

/// The seven checks tuned by `config`, in aggregation order
pub fn builtin_rules_with(config: &CheckerConfig) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(DocLangRule),
        Box::new(DocTitleRule),
        Box::new(ColorContrastRule),
        Box::new(ImageAltRule::new(config.images.max_alt_length)),
        Box::new(LinkTextRule::new(
            config.links.generic_phrases.clone(),
            config.links.exempt_hrefs.clone(),
        )),
        Box::new(HeadingOrderRule),
        Box::new(MultipleH1Rule),
    ]
}

/// Build a violation located at `element`
pub(crate) fn violation_at(
    rule_id: RuleId,
    message: impl Into<String>,
    element: Element<'_>,
) -> Violation {
    Violation::new(
        rule_id,
        message,
        element.tag_name(),
        selector_for(element),
        element.outer_html(),
    )
}
