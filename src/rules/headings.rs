//! Heading structure checks
//!
//! Level skips are judged against the immediately preceding heading only, so
//! h1, h3, h2 reports the h3 and nothing else.

use super::{violation_at, Rule};
use crate::document::{Document, Element};
use crate::domain::violations::{RuleId, Violation};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

const MULTIPLE_H1_MESSAGE: &str = "There should be only one <h1> tag per page.";

/// Numeric level of a heading tag (`h3` -> 3)
fn heading_level(element: &Element<'_>) -> Option<u8> {
    element.tag_name().strip_prefix('h')?.parse().ok()
}

/// Flags a heading more than one level deeper than the heading before it
pub struct HeadingOrderRule;

impl Rule for HeadingOrderRule {
    fn name(&self) -> &'static str {
        "Heading Order"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::HeadingOrder]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        let headings: Vec<(Element<'_>, u8)> = document
            .find_all_any(HEADING_TAGS)
            .into_iter()
            .filter_map(|h| heading_level(&h).map(|level| (h, level)))
            .collect();

        headings
            .windows(2)
            .filter(|pair| pair[1].1 > pair[0].1 + 1)
            .map(|pair| {
                let (previous, current) = (pair[0].0, pair[1].0);
                violation_at(
                    RuleId::HeadingOrder,
                    format!(
                        "Heading levels must not be skipped. Found {} followed by {}.",
                        previous.tag_name(),
                        current.tag_name()
                    ),
                    current,
                )
            })
            .collect()
    }
}

/// Flags every `<h1>` after the first
pub struct MultipleH1Rule;

impl Rule for MultipleH1Rule {
    fn name(&self) -> &'static str {
        "Single H1"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::HeadingMultipleH1]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        document
            .find_all("h1")
            .into_iter()
            .skip(1)
            .map(|h1| violation_at(RuleId::HeadingMultipleH1, MULTIPLE_H1_MESSAGE, h1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use rstest::rstest;

    fn headings_html(levels: &[u8]) -> String {
        levels.iter().map(|l| format!("<h{l}>Heading {l}</h{l}>")).collect()
    }

    #[rstest]
    #[case(&[1, 2, 3], 0)]
    #[case(&[1, 3, 2], 1)]
    #[case(&[1, 3, 5], 2)]
    #[case(&[2, 1, 3], 1)]
    #[case(&[3, 2, 1], 0)]
    #[case(&[4], 0)]
    #[case(&[1, 2, 6, 2, 4], 2)]
    fn test_heading_order_is_local(#[case] levels: &[u8], #[case] expected: usize) {
        let violations = HeadingOrderRule.check(&parse(&headings_html(levels)).unwrap());
        assert_eq!(violations.len(), expected);
    }

    #[test]
    fn test_heading_order_reports_the_skipping_heading() {
        let violations = HeadingOrderRule.check(&parse(&headings_html(&[1, 3, 2])).unwrap());

        assert_eq!(violations[0].element(), "h3");
        assert_eq!(
            violations[0].message(),
            "Heading levels must not be skipped. Found h1 followed by h3."
        );
        assert_eq!(violations[0].code_snippet(), "<h3>Heading 3</h3>");
    }

    #[test]
    fn test_heading_order_spans_nesting() {
        let html = "<header><h1>Site</h1></header><main><section><h4>Deep</h4></section></main>";
        let violations = HeadingOrderRule.check(&parse(html).unwrap());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].selector(), "html > body > main > section > h4");
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(4, 3)]
    fn test_multiple_h1_count(#[case] h1_count: usize, #[case] expected: usize) {
        let html = "<h1>Title</h1>".repeat(h1_count);
        let violations = MultipleH1Rule.check(&parse(&html).unwrap());

        assert_eq!(violations.len(), expected);
    }

    #[test]
    fn test_multiple_h1_skips_the_first() {
        let html = r#"<h1 id="first">A</h1><h1 id="second">B</h1><h1 id="third">C</h1>"#;
        let selectors: Vec<_> = MultipleH1Rule
            .check(&parse(html).unwrap())
            .iter()
            .map(|v| v.selector().to_string())
            .collect();

        assert_eq!(
            selectors,
            vec!["html > body > h1#second:nth-of-type(2)", "html > body > h1#third:nth-of-type(3)"]
        );
    }
}
