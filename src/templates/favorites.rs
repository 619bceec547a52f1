//! The favorites panel.
//!
//! `FavoritesList` is the ordered model (most recently saved first) and
//! `render_favorites_section` turns it into the `#favorites-section` subtree.
//! The section is re-rendered wholesale whenever the list changes.

use chrono::{DateTime, Utc};

use crate::dom::{html_escape, Document};
use crate::error::Result;
use crate::models::Favorite;
use crate::timefmt::format_relative;
use crate::FAVORITES_SECTION_ID;

#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteEntry {
    pub link_url: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesList {
    entries: Vec<FavoriteEntry>,
}

impl FavoritesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the list from a server response, most recently saved first.
    /// Entries without a timestamp are stamped with `loaded_at`; repeated
    /// URLs keep their first occurrence. Ties keep the server's order.
    pub fn from_favorites(favorites: &[Favorite], loaded_at: DateTime<Utc>) -> Self {
        let mut list = Self::new();
        for fav in favorites {
            if list.contains(&fav.link_url) {
                continue;
            }
            list.entries.push(FavoriteEntry {
                link_url: fav.link_url.clone(),
                saved_at: fav.saved_at.unwrap_or(loaded_at),
            });
        }
        list.entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        list
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.link_url == url)
    }

    /// Move `url` to the top with a fresh timestamp, inserting it if needed.
    pub fn upsert(&mut self, url: &str, saved_at: DateTime<Utc>) {
        self.entries.retain(|e| e.link_url != url);
        self.entries.insert(
            0,
            FavoriteEntry {
                link_url: url.to_string(),
                saved_at,
            },
        );
    }

    /// Returns true if an entry was removed.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.link_url != url);
        self.entries.len() != before
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Markup for `#favorites-section`, with time labels relative to `now`.
pub fn render_favorites_section(list: &FavoritesList, now: DateTime<Utc>) -> String {
    let body = if list.is_empty() {
        r#"<p id="favorites-empty" class="empty-state">No favorites yet. Click the heart next to a result to save it.</p>"#
            .to_string()
    } else {
        let mut items = String::from(r#"<ul id="favorites-list">"#);
        for entry in list.entries() {
            let url = html_escape(&entry.link_url);
            items.push_str(&format!(
                r#"<li class="favorite-item" data-link-url="{url}"><a class="favorite-link" href="{url}" target="_blank" rel="noopener">{url}</a><span class="saved-at" title="{exact}">{label}</span><button type="button" class="remove-favorite" data-link-url="{url}">Remove</button></li>"#,
                url = url,
                exact = entry.saved_at.to_rfc3339(),
                label = html_escape(&format_relative(entry.saved_at, now)),
            ));
        }
        items.push_str("</ul>");
        items
    };

    format!(
        r#"<section id="{id}" class="favorites-section"><h2>Favorites</h2>{body}</section>"#,
        id = FAVORITES_SECTION_ID,
        body = body,
    )
}

/// Replace the page's favorites section with a fresh render.
///
/// Returns false, leaving the page alone, when it has no favorites section.
pub fn render_section_into(doc: &mut Document, list: &FavoritesList) -> Result<bool> {
    let selector = format!("#{}", FAVORITES_SECTION_ID);
    if !doc.exists(&selector)? {
        return Ok(false);
    }
    let html = render_favorites_section(list, Utc::now());
    doc.replace_outer(&selector, &html)?;
    Ok(true)
}
