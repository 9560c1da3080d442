//! Document-level checks: declared language and page title

use super::{violation_at, Rule};
use crate::document::{Document, ROOT_SELECTOR};
use crate::domain::violations::{RuleId, Violation};

const LANG_MESSAGE: &str = "The document's primary language is not declared.";
const TITLE_MESSAGE: &str = "Every page must have a non-empty <title> tag.";

/// Selector reported when the document has no `<title>` at all
const SYNTHETIC_TITLE_SELECTOR: &str = "html > head > title";

/// Flags a missing `<html>` element or an absent/empty `lang` attribute
pub struct DocLangRule;

impl Rule for DocLangRule {
    fn name(&self) -> &'static str {
        "Document Language"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::DocLangMissing]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        match document.find_first("html") {
            Some(html) if html.attr("lang").is_some_and(|lang| !lang.is_empty()) => Vec::new(),
            Some(html) => vec![violation_at(RuleId::DocLangMissing, LANG_MESSAGE, html)],
            None => vec![Violation::new(
                RuleId::DocLangMissing,
                LANG_MESSAGE,
                "html",
                ROOT_SELECTOR,
                "<html>",
            )],
        }
    }
}

/// Flags a missing `<title>` or one whose trimmed text is empty
pub struct DocTitleRule;

impl Rule for DocTitleRule {
    fn name(&self) -> &'static str {
        "Document Title"
    }

    fn rule_ids(&self) -> &'static [RuleId] {
        &[RuleId::DocTitleMissing]
    }

    fn check(&self, document: &Document) -> Vec<Violation> {
        match document.find_first("title") {
            Some(title) if !title.text().is_empty() => Vec::new(),
            Some(title) => vec![violation_at(RuleId::DocTitleMissing, TITLE_MESSAGE, title)],
            None => vec![Violation::new(
                RuleId::DocTitleMissing,
                TITLE_MESSAGE,
                "title",
                SYNTHETIC_TITLE_SELECTOR,
                "<title>",
            )],
        }
    }
}
