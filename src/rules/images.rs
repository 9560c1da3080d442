//! Image alternative text checks
//!
//! One pass over `<img>` elements reporting, per image in document order, either a
//! missing alt (absent, empty or whitespace) or an alt longer than the limit.

use super::{violation_at, Rule};
use crate::document::Document;
use crate::domain::violations::{RuleId, Violation};

/// Default maximum alt text length, in characters
pub const DEFAULT_MAX_ALT_LENGTH: usize = 120;

const MISSING_MESSAGE: &str = "Informative images must have a descriptive 'alt' attribute.";

/// Flags images with missing or overlong alternative text
#[derive(Debug, Clone)]
pub struct ImageAltRule {
    max_alt_length: usize,
}

impl ImageAltRule {
    pub fn new(max_alt_length: usize) -> Self {
        Self { max_alt_length }
    }
}

impl Default for ImageAltRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALT_LENGTH)
    }
}

impl Rule for ImageAltRule {
    fn name(&self) -> &'static str {
        "Image Alt Text"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::ImgAltMissing, RuleId::ImgAltLength]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();

        for img in document.find_all("img") {
            let alt = img.attr("alt").unwrap_or("");
            let length = alt.chars().count();

            if alt.trim().is_empty() {
                violations.push(violation_at(RuleId::ImgAltMissing, MISSING_MESSAGE, img));
            } else if length > self.max_alt_length {
                violations.push(violation_at(
                    RuleId::ImgAltLength,
                    format!(
                        "Alt text should not exceed {} characters (currently {length}).",
                        self.max_alt_length
                    ),
                    img,
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use rstest::rstest;

    fn check(html: &str) -> Vec<Violation> {
        ImageAltRule::default().check(&parse(html).unwrap())
    }

    #[rstest]
    #[case::absent(r#"<img src="a.png">"#)]
    #[case::empty(r#"<img src="a.png" alt="">"#)]
    #[case::whitespace(r#"<img src="a.png" alt="   ">"#)]
    fn test_missing_alt(#[case] html: &str) {
        let violations = check(html);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id(), RuleId::ImgAltMissing);
        assert_eq!(violations[0].selector(), "html > body > img");
    }

    #[test]
    fn test_descriptive_alt_passes() {
        assert!(check(r#"<img src="chart.png" alt="Revenue grew 15% in Q4">"#).is_empty());
    }

    #[test]
    fn test_alt_length_boundary() {
        let exact = "a".repeat(120);
        assert!(check(&format!(r#"<img src="a.png" alt="{exact}">"#)).is_empty());

        let over = "a".repeat(121);
        let violations = check(&format!(r#"<img src="a.png" alt="{over}">"#));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id(), RuleId::ImgAltLength);
        assert_eq!(
            violations[0].message(),
            "Alt text should not exceed 120 characters (currently 121)."
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let alt = "é".repeat(100);
        assert!(check(&format!(r#"<img src="a.png" alt="{alt}">"#)).is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let doc = parse(r#"<img src="a.png" alt="twelve chars">"#).unwrap();
        let violations = ImageAltRule::new(5).check(&doc);

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message(),
            "Alt text should not exceed 5 characters (currently 12)."
        );
    }

    #[test]
    fn test_one_violation_per_image_in_document_order() {
        let long = "x".repeat(130);
        let html = format!(
            r#"<img src="1.png"><img src="2.png" alt="{long}"><img src="3.png" alt="ok"><img src="4.png">"#
        );
        let ids: Vec<_> = check(&html).iter().map(|v| v.rule_id()).collect();

        assert_eq!(
            ids,
            vec![RuleId::ImgAltMissing, RuleId::ImgAltLength, RuleId::ImgAltMissing]
        );
    }
}
