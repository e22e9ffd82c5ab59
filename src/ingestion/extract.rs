//! Plain-text extraction from page HTML.

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use scraper::node::Node;

/// Tags whose subtrees carry no prose.
const SKIPPED_TAGS: [&str; 2] = ["script", "style"];

/// Extracts the visible text of an HTML document.
///
/// `<script>` and `<style>` subtrees are dropped entirely, remaining text
/// nodes are concatenated, and all whitespace runs collapse to single
/// spaces. A page with no prose yields an empty string.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut buffer = String::new();
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        if let Node::Text(text) = node.value() {
            buffer.push_str(text);
            buffer.push(' ');
            continue;
        }
        if let Node::Element(element) = node.value() {
            let name = element.name();
            if SKIPPED_TAGS
                .iter()
                .any(|skipped| name.eq_ignore_ascii_case(skipped))
            {
                continue;
            }
        }
        // Reverse so the stack pops children in document order.
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }

    collapse_whitespace(&buffer)
}

fn collapse_whitespace(raw: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"));
    whitespace.replace_all(raw, " ").trim().to_string()
}
