//! HTML document model used by the rule checks
//!
//! Architecture: Anti-Corruption Layer - the html5ever tree behind `scraper` is wrapped
//! so rules only see tag names, attributes, text and structural navigation.
//! - Malformed markup is repaired by the HTML5 tree builder (implicit html/head/body, auto-closing)
//! - Parent links are node-table indices, never owning pointers
//! - The tree is read-only once parsed

pub mod selector;

use crate::domain::violations::{CheckerError, CheckerResult};
use scraper::{ElementRef, Html};

pub use selector::{selector_for, ROOT_SELECTOR};

/// Default upper bound on accepted document size (5 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Limits applied before a document is handed to the tree builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_document_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self { max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES }
    }
}

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.elements().count())
            .field("parse_errors", &self.html.errors.len())
            .finish()
    }
}

/// Parse HTML text with default limits
pub fn parse(html: &str) -> CheckerResult<Document> {
    Document::parse_with_limits(html, &ParseLimits::default())
}

/// Parse raw bytes; anything that is not UTF-8 text is rejected
pub fn parse_bytes(bytes: &[u8], limits: &ParseLimits) -> CheckerResult<Document> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CheckerError::parse(format!("Input is not valid UTF-8 text: {e}"))
    })?;
    Document::parse_with_limits(text, limits)
}

impl Document {
    /// Parse HTML text with default limits
    pub fn parse(html: &str) -> CheckerResult<Self> {
        parse(html)
    }

    /// Parse HTML text, failing only when the input exceeds `limits`
    pub fn parse_with_limits(html: &str, limits: &ParseLimits) -> CheckerResult<Self> {
        if html.len() > limits.max_document_bytes {
            return Err(CheckerError::parse(format!(
                "Document is {} bytes, limit is {} bytes",
                html.len(),
                limits.max_document_bytes
            )));
        }

        let html = Html::parse_document(html);
        if !html.errors.is_empty() {
            tracing::debug!("Recovered from {} HTML parse errors", html.errors.len());
        }

        Ok(Self { html })
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap).map(Element::new)
    }

    /// All elements with the given tag name, in document order
    pub fn find_all(&self, tag_name: &str) -> Vec<Element<'_>> {
        self.elements().filter(|e| e.tag_name() == tag_name).collect()
    }

    /// All elements whose tag name is any of `tag_names`, in document order
    pub fn find_all_any(&self, tag_names: &[&str]) -> Vec<Element<'_>> {
        self.elements().filter(|e| tag_names.contains(&e.tag_name())).collect()
    }

    /// First element with the given tag name
    pub fn find_first(&self, tag_name: &str) -> Option<Element<'_>> {
        self.elements().find(|e| e.tag_name() == tag_name)
    }

    /// All elements carrying the given attribute, in document order
    pub fn with_attribute(&self, name: &str) -> Vec<Element<'_>> {
        self.elements().filter(|e| e.has_attr(name)).collect()
    }
}

/// A borrowed element inside a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }

    /// Lower-cased tag name
    pub fn tag_name(&self) -> &'a str {
        self.inner.value().name()
    }

    /// Attribute value. `None` when absent, `Some("")` when present but empty.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Class tokens in attribute order
    pub fn classes(&self) -> Vec<&'a str> {
        self.attr("class").map(|c| c.split_whitespace().collect()).unwrap_or_default()
    }

    /// Concatenated descendant text, trimmed
    pub fn text(&self) -> String {
        self.inner.text().collect::<String>().trim().to_string()
    }

    /// Child elements; text and comment nodes are skipped
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        self.inner.children().filter_map(ElementRef::wrap).map(Element::new)
    }

    /// Parent element, or `None` when the parent is the document root
    pub fn parent(&self) -> Option<Element<'a>> {
        self.inner.parent().and_then(ElementRef::wrap).map(Element::new)
    }

    /// Elements sharing this element's parent (document root included) and tag name,
    /// in document order. Always contains `self`.
    pub fn same_tag_siblings(&self) -> Vec<Element<'a>> {
        let tag = self.tag_name();
        match self.inner.parent() {
            Some(parent) => parent
                .children()
                .filter_map(ElementRef::wrap)
                .map(Element::new)
                .filter(|e| e.tag_name() == tag)
                .collect(),
            None => vec![*self],
        }
    }

    /// Serialized source markup of this element
    pub fn outer_html(&self) -> String {
        self.inner.html()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id() == other.inner.id()
    }
}

impl Eq for Element<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairs_missing_structure() {
        let document = parse("<p>unclosed <b>bold").unwrap();

        let html = document.find_first("html").unwrap();
        let children: Vec<_> = html.children().map(|e| e.tag_name()).collect();
        assert_eq!(children, vec!["head", "body"]);
        assert!(document.find_first("b").is_some());
        assert!(html.parent().is_none());
    }

    #[test]
    fn test_attribute_absent_vs_empty() {
        let document = parse(r#"<img src="a.png" alt=""><img src="b.png">"#).unwrap();
        let images = document.find_all("img");

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].attr("alt"), Some(""));
        assert_eq!(images[1].attr("alt"), None);
        assert!(images[0].has_attr("src"));
    }

    #[test]
    fn test_text_is_trimmed_and_includes_descendants() {
        let document = parse("<a href='/x'>  read <span>more</span>  </a>").unwrap();
        let link = document.find_first("a").unwrap();

        assert_eq!(link.text(), "read more");
    }

    #[test]
    fn test_children_skip_text_nodes() {
        let document = parse("<ul>text<li>a</li> more <li>b</li></ul>").unwrap();
        let list = document.find_first("ul").unwrap();

        assert_eq!(list.children().count(), 2);
        let first = list.children().next().unwrap();
        assert_eq!(first.parent(), Some(list));
        assert_eq!(first.same_tag_siblings().len(), 2);
    }

    #[test]
    fn test_classes_keep_attribute_order() {
        let document = parse(r#"<div class=" zeta  alpha beta "></div>"#).unwrap();
        let div = document.find_first("div").unwrap();

        assert_eq!(div.classes(), vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_find_all_any_preserves_document_order() {
        let document = parse("<h2>a</h2><h1>b</h1><p>c</p><h3>d</h3>").unwrap();
        let headings: Vec<_> = document
            .find_all_any(&["h1", "h2", "h3"])
            .iter()
            .map(|e| e.tag_name())
            .collect();

        assert_eq!(headings, vec!["h2", "h1", "h3"]);
    }

    #[test]
    fn test_outer_html_serializes_element() {
        let document = parse(r#"<body><img src="x.png"></body>"#).unwrap();
        let img = document.find_first("img").unwrap();

        assert_eq!(img.outer_html(), r#"<img src="x.png">"#);
    }

    #[test]
    fn test_size_limit_is_a_parse_error() {
        let limits = ParseLimits { max_document_bytes: 8 };
        let err = Document::parse_with_limits("<html><body></body></html>", &limits).unwrap_err();

        assert!(err.is_parse_error());
    }

    #[test]
    fn test_non_utf8_bytes_are_a_parse_error() {
        let err = parse_bytes(&[0x3c, 0xff, 0xfe, 0x3e], &ParseLimits::default()).unwrap_err();
        assert!(err.is_parse_error());

        let ok = parse_bytes(b"<title>ok</title>", &ParseLimits::default()).unwrap();
        assert_eq!(ok.find_first("title").unwrap().text(), "ok");
    }

    #[test]
    fn test_with_attribute() {
        let document = parse(r#"<p style="color: red">a</p><p>b</p><span style="">c</span>"#)
            .unwrap();
        let styled: Vec<_> = document.with_attribute("style").iter().map(|e| e.tag_name()).collect();

        assert_eq!(styled, vec!["p", "span"]);
    }
}
