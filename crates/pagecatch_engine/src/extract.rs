use std::sync::LazyLock;

use ego_tree::NodeRef;
use pagecatch_logging::{catch_debug, catch_error, catch_warn};
use regex::Regex;
use scraper::node::Node;
use scraper::{Html, Selector};

use crate::locator::{looks_like_xpath, xpath_to_css};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid script regex"));

/// Elements whose text never contributes to the comparable text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe"];

/// Narrow a document to the first element, in document order, matched by
/// `locator`. XPath locators are rewritten to CSS; anything else is parsed as
/// a CSS selector.
///
/// An unparsable locator or one that matches nothing keeps the full document.
pub fn narrow_to_locator(html: &str, locator: &str) -> String {
    let css = if looks_like_xpath(locator) {
        match xpath_to_css(locator) {
            Ok(css) => {
                catch_debug!("XPath {locator:?} evaluated as {css:?}");
                css
            }
            Err(err) => {
                catch_error!("Invalid xpath locator {locator:?}: {err}");
                return html.to_string();
            }
        }
    } else {
        locator.to_string()
    };
    let selector = match Selector::parse(&css) {
        Ok(selector) => selector,
        Err(err) => {
            catch_error!("Invalid locator {locator:?}: {err}");
            return html.to_string();
        }
    };

    let document = Html::parse_document(html);
    match document.select(&selector).next() {
        Some(element) => {
            catch_debug!("Locator matched: {locator}");
            element.html()
        }
        None => {
            catch_warn!("Locator matched no element, keeping full document: {locator}");
            html.to_string()
        }
    }
}

/// Flatten markup into comparable plain text.
///
/// Script blocks are removed before parsing; style, noscript and iframe
/// subtrees contribute nothing. Remaining text nodes are trimmed, joined with
/// single spaces and whitespace runs collapsed. html5ever recovers from any
/// malformed input, so text that is not markup at all comes back as itself.
pub fn extract_text(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    let document = Html::parse_document(&without_scripts);

    let mut pieces = Vec::new();
    collect_text(*document.root_element(), &mut pieces);

    pieces
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text<'a>(node: NodeRef<'a, Node>, pieces: &mut Vec<&'a str>) {
    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed);
            }
        }
        Node::Element(element) => {
            if SKIPPED_ELEMENTS
                .iter()
                .any(|skipped| element.name().eq_ignore_ascii_case(skipped))
            {
                return;
            }
            for child in node.children() {
                collect_text(child, pieces);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, pieces);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_text, narrow_to_locator};

    #[test]
    fn scripts_styles_and_frames_are_dropped() {
        let html = r#"<html><head><title>T</title><style>p{}</style>
            <SCRIPT type="text/javascript">var x = "<b>no</b>";</SCRIPT></head>
            <body><p>Hello</p><noscript>enable js</noscript>
            <iframe src="x">frame</iframe><p>  world  </p></body></html>"#;
        assert_eq!(extract_text(html), "T Hello world");
    }

    #[test]
    fn whitespace_runs_collapse() {
        let html = "<div>A\n\n   B</div><div>\tC </div>";
        assert_eq!(extract_text(html), "A B C");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(extract_text("A B C"), "A B C");
        assert_eq!(extract_text(""), "");
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        let html = "<div><p>open <b>bold <i>both</div></p> tail <<>>";
        let text = extract_text(html);
        assert!(text.contains("open bold both"));
        assert!(text.contains("tail"));
    }

    #[test]
    fn locator_selects_first_match() {
        let html = r#"<body><div id="nav">menu</div><div id="main"><p>news</p></div></body>"#;
        let narrowed = narrow_to_locator(html, "div#main");
        assert!(narrowed.starts_with("<div id=\"main\">"));
        assert_eq!(extract_text(&narrowed), "news");
    }

    #[test]
    fn xpath_locator_selects_region() {
        let html = r#"<div id="ad">ad 1</div><div id="news">item</div>"#;
        let narrowed = narrow_to_locator(html, "//div[@id='news']");
        assert_eq!(extract_text(&narrowed), "item");
    }

    #[test]
    fn absolute_xpath_with_position() {
        let html = "<html><body><div>one</div><div><p>two</p></div></body></html>";
        let narrowed = narrow_to_locator(html, "/html/body/div[2]");
        assert_eq!(extract_text(&narrowed), "two");
    }

    #[test]
    fn locator_miss_or_error_keeps_document() {
        let html = "<body><p>all</p></body>";
        assert_eq!(narrow_to_locator(html, "section.none"), html);
        assert_eq!(narrow_to_locator(html, "//div[@id='x']"), html);
        assert_eq!(narrow_to_locator(html, "//p/following-sibling::p"), html);
        assert_eq!(narrow_to_locator(html, "p[[["), html);
    }
}
