// src/page/text.rs
// =============================================================================
// This module pulls visible text and links out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM tree (built on html5ever)
// - Never fails: broken markup is repaired the way a browser would
//
// One walk over the tree collects both:
// - text nodes, in document order, skipping script/style/noscript/template
// - the href of every <a> element
//
// Each text node becomes one fragment. Whitespace inside a fragment is
// collapsed to single spaces; empty fragments are dropped.
// =============================================================================

use scraper::{Html, Node};

// Elements whose text is never shown to a reader
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// What a page contributed: its text and the hrefs it points to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Visible text fragments, in document order
    pub fragments: Vec<String>,
    /// Raw href values of anchor elements, in document order
    pub links: Vec<String>,
}

/// Extracts text fragments and anchor hrefs from raw HTML bytes
///
/// Bytes that are not valid UTF-8 are replaced, not rejected.
///
/// Example:
///   html = "<p>Hello <b>world</b></p><a href='/docs'>Docs</a>"
///   fragments = ["Hello", "world", "Docs"]
///   links = ["/docs"]
pub fn extract_page(html: &[u8]) -> PageContent {
    let source = String::from_utf8_lossy(html);
    let document = Html::parse_document(&source);

    let mut content = PageContent::default();

    for node in document.tree.root().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                    Node::Element(element) => HIDDEN_ELEMENTS.contains(&element.name()),
                    _ => false,
                });
                if hidden {
                    continue;
                }

                let fragment = normalize_whitespace(text);
                if !fragment.is_empty() {
                    content.fragments.push(fragment);
                }
            }
            Node::Element(element) if element.name() == "a" => {
                if let Some(href) = element.attr("href") {
                    content.links.push(href.to_string());
                }
            }
            _ => {}
        }
    }

    content
}

/// Collapses every whitespace run to one space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_in_document_order() {
        let html = b"<html><head><title>Docs</title></head>\
            <body><h1>Intro</h1><p>Hello <b>world</b></p></body></html>";
        let page = extract_page(html);
        assert_eq!(page.fragments, vec!["Docs", "Intro", "Hello", "world"]);
    }

    #[test]
    fn test_skips_script_and_style() {
        let html = br#"<body>
            <script>var secret = 1;</script>
            <style>p { color: red }</style>
            <noscript>Enable JS</noscript>
            <p>Visible</p>
        </body>"#;
        let page = extract_page(html);
        assert_eq!(page.fragments, vec!["Visible"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = b"<p>  line one\n\n   line\ttwo  </p>";
        let page = extract_page(html);
        assert_eq!(page.fragments, vec!["line one line two"]);
    }

    #[test]
    fn test_collects_anchor_hrefs() {
        let html = br#"
            <a href="/docs">Docs</a>
            <a>No href</a>
            <a href="https://other.com">Other</a>
            <link href="/style.css">
        "#;
        let page = extract_page(html);
        assert_eq!(page.links, vec!["/docs", "https://other.com"]);
    }

    #[test]
    fn test_malformed_html_degrades() {
        let html = b"<div><p>Unclosed <b>tags <i>everywhere</div></span>";
        let page = extract_page(html);
        assert!(page.fragments.contains(&"Unclosed".to_string()));
        assert!(page.fragments.contains(&"everywhere".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let html = b"<p>caf\xff</p>";
        let page = extract_page(html);
        assert_eq!(page.fragments.len(), 1);
        assert!(page.fragments[0].starts_with("caf"));
    }
}
