//! Heart buttons: the favorite toggle rendered next to each result link.
//!
//! A button is bound to its link through `data-link-url`; which operation a
//! click performs is carried in `data-action` and read back by the binding
//! scan, so no handler code ever lives in the markup.

use lol_html::html_content::{ContentType, Element};
use lol_html::HandlerResult;

use crate::dom::{add_class, attribute, remove_class, Document};
use crate::error::Result;
use crate::store::FavoritesStore;
use crate::HEART_BUTTON_SELECTOR;

const FAVORITED_CLASS: &str = "favorited";
const ICON_FILLED: &str = "\u{2665}";
const ICON_OUTLINE: &str = "\u{2661}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartState {
    Favorited,
    Unfavorited,
}

impl HeartState {
    pub fn from_favorited(favorited: bool) -> Self {
        if favorited {
            HeartState::Favorited
        } else {
            HeartState::Unfavorited
        }
    }

    /// Value of `data-action`: what a click on a button in this state does.
    pub fn action(&self) -> &'static str {
        match self {
            HeartState::Favorited => "remove",
            HeartState::Unfavorited => "add",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            HeartState::Favorited => "Click to unfavorite",
            HeartState::Unfavorited => "Click to favorite",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            HeartState::Favorited => ICON_FILLED,
            HeartState::Unfavorited => ICON_OUTLINE,
        }
    }
}

fn apply_state(el: &mut Element<'_, '_>, state: HeartState) -> HandlerResult {
    match state {
        HeartState::Favorited => add_class(el, FAVORITED_CLASS)?,
        HeartState::Unfavorited => remove_class(el, FAVORITED_CLASS)?,
    }
    el.set_attribute("title", state.title())?;
    el.set_attribute("aria-label", state.title())?;
    el.set_attribute("data-action", state.action())?;
    el.set_inner_content(state.icon(), ContentType::Text);
    Ok(())
}

/// Render every heart button bound to `url`. Returns how many were touched.
///
/// The same link can appear in several result rows, so this always scans the
/// whole document rather than stopping at the first match.
pub fn update_all_heart_buttons(doc: &mut Document, url: &str, favorited: bool) -> Result<usize> {
    let state = HeartState::from_favorited(favorited);
    let mut touched = 0;
    doc.rewrite(HEART_BUTTON_SELECTOR, |el| {
        if attribute(el, "data-link-url").as_deref() == Some(url) {
            apply_state(el, state)?;
            touched += 1;
        }
        Ok(())
    })?;
    Ok(touched)
}

/// Re-render every heart button on the page against the store.
pub fn render_all_from_store(doc: &mut Document, store: &FavoritesStore) -> Result<()> {
    doc.rewrite(HEART_BUTTON_SELECTOR, |el| {
        let favorited = attribute(el, "data-link-url")
            .map(|url| store.contains(&url))
            .unwrap_or(false);
        apply_state(el, HeartState::from_favorited(favorited))
    })
}

/// Current state of each heart button bound to `url`, in document order.
pub fn heart_states(doc: &Document, url: &str) -> Result<Vec<HeartState>> {
    Ok(doc
        .select(HEART_BUTTON_SELECTOR)?
        .into_iter()
        .filter(|info| info.attr("data-link-url") == Some(url))
        .map(|info| HeartState::from_favorited(info.has_class(FAVORITED_CLASS)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "https://a.example/a.pdf";
    const B: &str = "https://b.example/b.pdf";

    fn page() -> Document {
        Document::new(format!(
            r#"<div id="search-results">
<div class="result"><a class="result-link" data-link-url="{A}" href="{A}">a</a><button class="heart-btn" data-link-url="{A}">?</button></div>
<div class="result"><a class="result-link" data-link-url="{B}" href="{B}">b</a><button class="heart-btn" data-link-url="{B}">?</button></div>
<div class="result"><a class="result-link" data-link-url="{A}" href="{A}">a again</a><button class="heart-btn" data-link-url="{A}">?</button></div>
</div>"#
        ))
    }

    #[test]
    fn test_update_all_touches_every_matching_button() {
        let mut doc = page();
        let touched = update_all_heart_buttons(&mut doc, A, true).unwrap();
        assert_eq!(touched, 2);
        assert_eq!(
            heart_states(&doc, A).unwrap(),
            vec![HeartState::Favorited, HeartState::Favorited]
        );
        assert_eq!(heart_states(&doc, B).unwrap(), vec![HeartState::Unfavorited]);
    }

    #[test]
    fn test_favorited_markup() {
        let mut doc = page();
        update_all_heart_buttons(&mut doc, B, true).unwrap();
        let button = doc
            .select(HEART_BUTTON_SELECTOR)
            .unwrap()
            .into_iter()
            .find(|b| b.attr("data-link-url") == Some(B))
            .unwrap();
        assert!(button.has_class("heart-btn"));
        assert!(button.has_class("favorited"));
        assert_eq!(button.attr("data-action"), Some("remove"));
        assert_eq!(button.attr("title"), Some("Click to unfavorite"));
        assert!(doc.html().contains(ICON_FILLED));
    }

    #[test]
    fn test_unfavorite_restores_outline_state() {
        let mut doc = page();
        update_all_heart_buttons(&mut doc, A, true).unwrap();
        update_all_heart_buttons(&mut doc, A, false).unwrap();
        let buttons: Vec<_> = doc
            .select(HEART_BUTTON_SELECTOR)
            .unwrap()
            .into_iter()
            .filter(|b| b.attr("data-link-url") == Some(A))
            .collect();
        assert_eq!(buttons.len(), 2);
        for button in buttons {
            assert!(!button.has_class("favorited"));
            assert_eq!(button.attr("data-action"), Some("add"));
            assert_eq!(button.attr("title"), Some("Click to favorite"));
        }
        assert!(!doc.html().contains(ICON_FILLED));
    }

    #[test]
    fn test_render_all_from_store() {
        let mut doc = page();
        let mut store = FavoritesStore::new();
        store.insert(B);
        render_all_from_store(&mut doc, &store).unwrap();
        assert_eq!(heart_states(&doc, B).unwrap(), vec![HeartState::Favorited]);
        assert_eq!(
            heart_states(&doc, A).unwrap(),
            vec![HeartState::Unfavorited, HeartState::Unfavorited]
        );

        // Rendering is idempotent.
        let before = doc.html().to_string();
        render_all_from_store(&mut doc, &store).unwrap();
        assert_eq!(doc.html(), before);
    }

    #[test]
    fn test_no_buttons_is_a_no_op() {
        let mut doc = Document::new("<p>nothing here</p>");
        assert_eq!(update_all_heart_buttons(&mut doc, A, true).unwrap(), 0);
        assert_eq!(doc.html(), "<p>nothing here</p>");
    }
}
