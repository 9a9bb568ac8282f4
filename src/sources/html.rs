//! Text extraction from scraped lyrics pages.

use scraper::{ElementRef, Html, Node, Selector};

/// Text of the first element matching `selector`, or `None` when nothing
/// matches or the match is blank.
pub fn select_text(html: &str, selector: &Selector) -> Option<String> {
    let doc = Html::parse_document(html);
    let el = doc.select(selector).next()?;
    non_blank(element_text(el))
}

/// Text of every element matching `selector`, joined by newlines.
pub fn select_all_text(html: &str, selector: &Selector) -> Option<String> {
    let doc = Html::parse_document(html);
    let parts: Vec<String> = doc.select(selector).map(element_text).collect();
    non_blank(parts.join("\n"))
}

/// Flatten an element to text: `<br>` becomes a newline, nested `<script>`,
/// `<style>` and `<div>` elements are dropped, other markup is stripped.
pub fn element_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_children(el, &mut out);
    out.trim().to_string()
}

fn push_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => match e.name() {
                "br" => out.push('\n'),
                "script" | "style" | "div" => {}
                _ => {
                    if let Some(inner) = ElementRef::wrap(child) {
                        push_children(inner, out);
                    }
                }
            },
            _ => {}
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
