//! Structural selector generation
//!
//! Builds a CSS child-combinator path from the document root down to an element:
//! `tag`, then `#id` or `.class.class`, then `:nth-of-type(k)` when the parent has
//! more than one child with the same tag. Selectors are computed fresh on every call.

use super::Element;

/// Selector of the document root itself, also used for synthetic locations
pub const ROOT_SELECTOR: &str = "html";

/// Derive the structural selector for `element`
pub fn selector_for(element: Element<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(element);

    while let Some(node) = current {
        segments.push(segment_for(node));
        current = node.parent();
    }

    segments.reverse();
    segments.join(" > ")
}

/// Selector segment for a single element, without its ancestors
fn segment_for(element: Element<'_>) -> String {
    let mut segment = element.tag_name().to_string();

    match element.attr("id").filter(|id| !id.is_empty()) {
        Some(id) => {
            segment.push('#');
            segment.push_str(id);
        }
        None => {
            let classes = element.classes();
            if !classes.is_empty() {
                segment.push('.');
                segment.push_str(&classes.join("."));
            }
        }
    }

    let siblings = element.same_tag_siblings();
    if siblings.len() > 1 {
        if let Some(position) = siblings.iter().position(|s| *s == element) {
            segment.push_str(&format!(":nth-of-type({})", position + 1));
        }
    }

    segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    #[test]
    fn test_html_root_selector() {
        let document = parse("<html><body></body></html>").unwrap();
        let html = document.find_first("html").unwrap();

        assert_eq!(selector_for(html), ROOT_SELECTOR);
    }

    #[test]
    fn test_nested_path() {
        let document = parse("<html><body><main><p>text</p></main></body></html>").unwrap();
        let p = document.find_first("p").unwrap();

        assert_eq!(selector_for(p), "html > body > main > p");
    }

    #[test]
    fn test_id_takes_precedence_over_classes() {
        let document = parse(r#"<div id="hero" class="wide dark"><img src="x"></div>"#).unwrap();
        let img = document.find_first("img").unwrap();

        assert_eq!(selector_for(img), "html > body > div#hero > img");
    }

    #[test]
    fn test_empty_id_falls_back_to_classes() {
        let document = parse(r#"<div id="" class="card featured">x</div>"#).unwrap();
        let div = document.find_first("div").unwrap();

        assert_eq!(selector_for(div), "html > body > div.card.featured");
    }

    #[test]
    fn test_same_tag_siblings_are_numbered() {
        let document = parse("<ul><li>one</li><li>two</li><li>three</li></ul>").unwrap();
        let items = document.find_all("li");

        assert_eq!(selector_for(items[0]), "html > body > ul > li:nth-of-type(1)");
        assert_eq!(selector_for(items[1]), "html > body > ul > li:nth-of-type(2)");
        assert_eq!(selector_for(items[2]), "html > body > ul > li:nth-of-type(3)");
    }

    #[test]
    fn test_only_same_tag_siblings_count() {
        let document = parse("<div><p>a</p><span>b</span><p>c</p><h2>d</h2></div>").unwrap();

        let h2 = document.find_first("h2").unwrap();
        assert_eq!(selector_for(h2), "html > body > div > h2");

        let second_p = document.find_all("p")[1];
        assert_eq!(selector_for(second_p), "html > body > div > p:nth-of-type(2)");
    }

    #[test]
    fn test_ancestors_are_numbered_too() {
        let document = parse("<section><a>x</a></section><section><a>y</a></section>").unwrap();
        let links = document.find_all("a");

        assert_eq!(selector_for(links[1]), "html > body > section:nth-of-type(2) > a");
    }

    #[test]
    fn test_selector_is_deterministic() {
        let document = parse(r#"<nav class="top"><a href="/">a</a><a href="/b">b</a></nav>"#)
            .unwrap();
        let link = document.find_all("a")[1];

        assert_eq!(selector_for(link), selector_for(link));
        assert_eq!(selector_for(link), "html > body > nav.top > a:nth-of-type(2)");
    }
}
