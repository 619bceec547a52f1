//! The live page document.
//!
//! The page is held as an HTML string and every query or mutation goes
//! through `lol_html`'s streaming rewriter. Selectors used here are crate
//! constants; `lol_html` panics on a selector it cannot parse, so never build
//! one from page content.

use crate::error::{ClientError, Result};
use lol_html::html_content::{ContentType, Element};
use lol_html::{element, rewrite_str, HandlerResult, RewriteStrSettings};
use std::cell::RefCell;
use std::collections::HashMap;

// ============================================================================
// Element Snapshots
// ============================================================================

/// Read-only snapshot of one matched element's start tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementInfo {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| class_list_contains(c, class))
            .unwrap_or(false)
    }
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    html: String,
}

impl Document {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Swap in a whole new page, as after a full reload.
    pub fn replace_all(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    /// Start-tag snapshots of every element matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementInfo>> {
        let found = RefCell::new(Vec::new());
        run(
            &self.html,
            RewriteStrSettings {
                element_content_handlers: vec![element!(selector, |el| {
                    found.borrow_mut().push(snapshot(el));
                    Ok(())
                })],
                ..RewriteStrSettings::default()
            },
        )?;
        Ok(found.into_inner())
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(!self.select(selector)?.is_empty())
    }

    /// Apply `f` to every element matching `selector`.
    pub fn rewrite<F>(&mut self, selector: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&mut Element<'_, '_>) -> HandlerResult,
    {
        self.html = run(
            &self.html,
            RewriteStrSettings {
                element_content_handlers: vec![element!(selector, |el| f(el))],
                ..RewriteStrSettings::default()
            },
        )?;
        Ok(())
    }

    /// Replace every element matching `selector` (and its subtree) with `html`.
    pub fn replace_outer(&mut self, selector: &str, html: &str) -> Result<()> {
        self.rewrite(selector, |el| {
            el.replace(html, ContentType::Html);
            Ok(())
        })
    }
}

// ============================================================================
// Fragment Extraction
// ============================================================================

/// Outer HTML of the elements with the given ids, keyed by id.
///
/// Each target is bracketed with comment markers in a rewrite pass and then
/// cut out of the rewritten text. Ids missing from `html` are absent from the
/// returned map.
pub fn extract_fragments(html: &str, ids: &[&str]) -> Result<HashMap<String, String>> {
    let handlers: Vec<_> = ids
        .iter()
        .map(|id| {
            let begin = begin_marker(id);
            let end = end_marker(id);
            element!(format!("#{}", id), move |el| {
                el.before(&begin, ContentType::Html);
                el.after(&end, ContentType::Html);
                Ok(())
            })
        })
        .collect();

    let marked = run(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )?;

    let mut fragments = HashMap::new();
    for id in ids {
        let begin = begin_marker(id);
        let end = end_marker(id);
        let Some(start) = marked.find(&begin) else {
            continue;
        };
        let body_start = start + begin.len();
        if let Some(len) = marked[body_start..].find(&end) {
            let fragment = strip_markers(&marked[body_start..body_start + len], ids);
            fragments.insert(id.to_string(), fragment);
        }
    }
    Ok(fragments)
}

fn begin_marker(id: &str) -> String {
    format!("<!--pdf-finder:begin:{}-->", id)
}

fn end_marker(id: &str) -> String {
    format!("<!--pdf-finder:end:{}-->", id)
}

// Nested targets leave their markers inside the outer fragment.
fn strip_markers(fragment: &str, ids: &[&str]) -> String {
    let mut out = fragment.to_string();
    for id in ids {
        out = out.replace(&begin_marker(id), "").replace(&end_marker(id), "");
    }
    out
}

// ============================================================================
// Helpers
// ============================================================================

fn run(html: &str, settings: RewriteStrSettings<'_, '_>) -> Result<String> {
    rewrite_str(html, settings).map_err(|e| ClientError::Rewrite(e.to_string()))
}

fn snapshot(el: &Element<'_, '_>) -> ElementInfo {
    ElementInfo {
        tag: el.tag_name(),
        attrs: el
            .attributes()
            .iter()
            .map(|a| (a.name(), decode_entities(&a.value())))
            .collect(),
    }
}

/// Read an attribute with entities decoded.
pub fn attribute(el: &Element<'_, '_>, name: &str) -> Option<String> {
    el.get_attribute(name).map(|v| decode_entities(&v))
}

/// Write free text into an attribute so `attribute` reads it back unchanged.
///
/// `set_attribute` stores the value as raw markup, so a literal `&lt;` would
/// otherwise decode to `<` on the next read.
pub fn set_attribute_text(el: &mut Element<'_, '_>, name: &str, value: &str) -> HandlerResult {
    el.set_attribute(name, &::html_escape::encode_double_quoted_attribute(value))?;
    Ok(())
}

pub fn class_list_contains(class_attr: &str, class: &str) -> bool {
    class_attr.split_whitespace().any(|c| c == class)
}

pub fn add_class(el: &mut Element<'_, '_>, class: &str) -> HandlerResult {
    let current = el.get_attribute("class").unwrap_or_default();
    if class_list_contains(&current, class) {
        return Ok(());
    }
    let next = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim(), class)
    };
    el.set_attribute("class", &next)?;
    Ok(())
}

pub fn remove_class(el: &mut Element<'_, '_>, class: &str) -> HandlerResult {
    let Some(current) = el.get_attribute("class") else {
        return Ok(());
    };
    let next: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
    el.set_attribute("class", &next.join(" "))?;
    Ok(())
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Decode named and numeric character references in attribute text.
pub fn decode_entities(s: &str) -> String {
    ::html_escape::decode_html_entities(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body id="app-body" class="page">
<form id="search-form"><input name="query" value="rust"></form>
<div id="search-results"><a class="result-link" data-link-url="https://a.example/1.pdf" href="https://a.example/1.pdf">one</a><div id="inner">x</div></div>
</body></html>"#;

    #[test]
    fn test_select_snapshots_attributes() {
        let doc = Document::new(PAGE);
        let links = doc.select("a.result-link").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tag, "a");
        assert_eq!(links[0].attr("data-link-url"), Some("https://a.example/1.pdf"));
        assert!(links[0].has_class("result-link"));
        assert!(!links[0].has_class("result"));
    }

    #[test]
    fn test_exists() {
        let doc = Document::new(PAGE);
        assert!(doc.exists("#search-form").unwrap());
        assert!(!doc.exists("#favorites-section").unwrap());
    }

    #[test]
    fn test_add_and_remove_class() {
        let mut doc = Document::new(PAGE);
        doc.rewrite("#app-body", |el| add_class(el, "dark-mode")).unwrap();
        doc.rewrite("#app-body", |el| add_class(el, "dark-mode")).unwrap();
        let body = &doc.select("#app-body").unwrap()[0];
        assert_eq!(body.attr("class"), Some("page dark-mode"));

        doc.rewrite("#app-body", |el| remove_class(el, "dark-mode")).unwrap();
        let body = &doc.select("#app-body").unwrap()[0];
        assert_eq!(body.attr("class"), Some("page"));
    }

    #[test]
    fn test_replace_outer() {
        let mut doc = Document::new(PAGE);
        doc.replace_outer("#search-results", r#"<div id="search-results">empty</div>"#)
            .unwrap();
        assert!(doc.html().contains(r#"<div id="search-results">empty</div>"#));
        assert!(!doc.exists("a.result-link").unwrap());
    }

    #[test]
    fn test_extract_fragments_outer_html() {
        let fragments = extract_fragments(PAGE, &["search-form", "search-results", "missing"]).unwrap();
        assert_eq!(
            fragments["search-form"],
            r#"<form id="search-form"><input name="query" value="rust"></form>"#
        );
        assert!(fragments["search-results"].starts_with(r#"<div id="search-results">"#));
        assert!(fragments["search-results"].ends_with("</div></div>"));
        assert!(!fragments.contains_key("missing"));
    }

    #[test]
    fn test_extract_nested_fragment_has_no_markers() {
        let fragments = extract_fragments(PAGE, &["search-results", "inner"]).unwrap();
        assert!(!fragments["search-results"].contains("pdf-finder:"));
        assert_eq!(fragments["inner"], r#"<div id="inner">x</div>"#);
    }

    #[test]
    fn test_entity_round_trip() {
        let raw = r#"https://a.example/q?a=1&b="2""#;
        assert_eq!(decode_entities(&html_escape(raw)), raw);
    }

    #[test]
    fn test_decode_numeric_references() {
        // Jinja's markupsafe writes quotes as decimal references.
        assert_eq!(decode_entities("say &#34;hi&#34;"), r#"say "hi""#);
        assert_eq!(decode_entities("&#x3C;b&#x3e;"), "<b>");
        assert_eq!(decode_entities("a&amp;lt;b"), "a&lt;b");
    }

    #[test]
    fn test_attribute_text_reads_back_unchanged() {
        let mut doc = Document::new(PAGE);
        let value = r#"a&lt;b & "c""#;
        doc.rewrite("input", |el| set_attribute_text(el, "value", value))
            .unwrap();
        let input = &doc.select("input").unwrap()[0];
        assert_eq!(input.attr("value"), Some(value));
    }

    #[test]
    fn test_select_decodes_server_markup() {
        let doc = Document::new(r#"<a class="result-link" data-link-url="https://a.example/?q=1&amp;t=&#34;x&#34;">x</a>"#);
        let link = &doc.select("a").unwrap()[0];
        assert_eq!(link.attr("data-link-url"), Some(r#"https://a.example/?q=1&t="x""#));
    }
}
