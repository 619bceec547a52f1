//! In-place search form submission.
//!
//! Submitting posts the form to `/` and gets a whole page back. Instead of
//! navigating, the three client-visible regions of that page (results,
//! favorites and the form itself) are cut out and spliced into the live
//! document.

use lol_html::html_content::ContentType;
use tracing::{info, warn};

use crate::api::Backend;
use crate::dom::{extract_fragments, set_attribute_text, Document};
use crate::error::Result;
use crate::models::SearchSubmission;
use crate::{
    APP_BODY_SELECTOR, FAVORITES_SECTION_ID, QUERY_INPUT_SELECTOR, RESULT_LINK_SELECTOR,
    SEARCH_FORM_ID, SEARCH_RESULTS_ID,
};

/// Regions that may be inserted after the form, in page order.
const TRAILING_REGIONS: [&str; 2] = [SEARCH_RESULTS_ID, FAVORITES_SECTION_ID];

/// What a splice did to each region, by element id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpliceReport {
    pub replaced: Vec<String>,
    pub inserted: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Spliced(SpliceReport),
    Failed(String),
}

/// Current value of the form's query input, if the page has one.
pub fn query(doc: &Document) -> Result<Option<String>> {
    Ok(doc
        .select(QUERY_INPUT_SELECTOR)?
        .into_iter()
        .next()
        .map(|input| input.attr("value").unwrap_or_default().to_string()))
}

/// Type into the query input. Returns false when the page has none.
pub fn set_query(doc: &mut Document, value: &str) -> Result<bool> {
    let mut found = false;
    doc.rewrite(QUERY_INPUT_SELECTOR, |el| {
        set_attribute_text(el, "value", value)?;
        found = true;
        Ok(())
    })?;
    Ok(found)
}

/// Post `submission` and splice the answer into `doc`.
///
/// A failed request leaves the document exactly as it was.
pub async fn submit<B: Backend + ?Sized>(
    backend: &B,
    doc: &mut Document,
    submission: &SearchSubmission,
) -> SubmitOutcome {
    let html = match backend.submit_search(submission).await {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Search submission failed");
            return SubmitOutcome::Failed(e.to_string());
        }
    };

    let mut next = doc.clone();
    match splice_fragments(&mut next, &html) {
        Ok(report) => {
            *doc = next;
            info!(
                replaced = report.replaced.len(),
                inserted = report.inserted.len(),
                removed = report.removed.len(),
                "Spliced search response"
            );
            SubmitOutcome::Spliced(report)
        }
        Err(e) => {
            warn!(error = %e, "Could not splice search response");
            SubmitOutcome::Failed(e.to_string())
        }
    }
}

/// Replace the page's regions with their counterparts from `response_html`.
///
/// A region in both is replaced. A region only in the response is inserted
/// after the form. A region only on the page is removed.
pub fn splice_fragments(doc: &mut Document, response_html: &str) -> Result<SpliceReport> {
    let ids = [SEARCH_RESULTS_ID, FAVORITES_SECTION_ID, SEARCH_FORM_ID];
    let incoming = extract_fragments(response_html, &ids)?;
    let mut report = SpliceReport::default();

    let mut inserts = String::new();
    for id in TRAILING_REGIONS {
        let selector = format!("#{}", id);
        let present = doc.exists(&selector)?;
        match (incoming.get(id), present) {
            (Some(fragment), true) => {
                doc.replace_outer(&selector, fragment)?;
                report.replaced.push(id.to_string());
            }
            (Some(fragment), false) => {
                inserts.push_str(fragment);
                report.inserted.push(id.to_string());
            }
            (None, true) => {
                remove(doc, &selector)?;
                report.removed.push(id.to_string());
            }
            (None, false) => {}
        }
    }

    let form_selector = format!("#{}", SEARCH_FORM_ID);
    let form_present = doc.exists(&form_selector)?;

    // Insert before touching the form so the old form is still the anchor.
    if !inserts.is_empty() {
        if form_present {
            doc.rewrite(&form_selector, |el| {
                el.after(&inserts, ContentType::Html);
                Ok(())
            })?;
        } else {
            append_to_body(doc, &inserts)?;
        }
    }

    match (incoming.get(SEARCH_FORM_ID), form_present) {
        (Some(fragment), true) => {
            doc.replace_outer(&form_selector, fragment)?;
            report.replaced.push(SEARCH_FORM_ID.to_string());
        }
        (Some(fragment), false) => {
            prepend_to_body(doc, fragment)?;
            report.inserted.push(SEARCH_FORM_ID.to_string());
        }
        (None, true) => {
            remove(doc, &form_selector)?;
            report.removed.push(SEARCH_FORM_ID.to_string());
        }
        (None, false) => {}
    }

    Ok(report)
}

fn remove(doc: &mut Document, selector: &str) -> Result<()> {
    doc.rewrite(selector, |el| {
        el.remove();
        Ok(())
    })
}

fn append_to_body(doc: &mut Document, html: &str) -> Result<()> {
    if doc.exists(APP_BODY_SELECTOR)? {
        doc.rewrite(APP_BODY_SELECTOR, |el| {
            el.append(html, ContentType::Html);
            Ok(())
        })
    } else {
        let mut page = doc.html().to_string();
        page.push_str(html);
        doc.replace_all(page);
        Ok(())
    }
}

fn prepend_to_body(doc: &mut Document, html: &str) -> Result<()> {
    if doc.exists(APP_BODY_SELECTOR)? {
        doc.rewrite(APP_BODY_SELECTOR, |el| {
            el.prepend(html, ContentType::Html);
            Ok(())
        })
    } else {
        let page = format!("{}{}", html, doc.html());
        doc.replace_all(page);
        Ok(())
    }
}

/// The `data-link-url` of every result link, in page order.
pub fn result_links(doc: &Document) -> Result<Vec<String>> {
    Ok(doc
        .select(RESULT_LINK_SELECTOR)?
        .into_iter()
        .filter_map(|link| link.attr("data-link-url").map(str::to_string))
        .collect())
}

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;
