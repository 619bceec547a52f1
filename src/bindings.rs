//! Event bindings derived from the document.
//!
//! Interactive elements identify themselves with `data-link-url` (and heart
//! buttons with `data-action`). A scan turns them into a registry keyed by
//! target, and the page rebuilds it after every change to the document, so a
//! splice or re-render can never leave a stale handler behind.

use std::collections::HashMap;

use crate::dom::{Document, ElementInfo};
use crate::error::Result;
use crate::{
    DROP_ZONE_SELECTOR, HEART_BUTTON_SELECTOR, REMOVE_FAVORITE_SELECTOR, RESULT_LINK_SELECTOR,
    THEME_TOGGLE_SELECTOR,
};

/// Something on the page a user can activate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    ResultLink(String),
    HeartButton(String),
    RemoveFavorite(String),
    DropZone,
    ThemeToggle,
}

/// What activating a target does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TrackClick(String),
    AddFavorite(String),
    RemoveFavorite(String),
    OpenFilePicker,
    ToggleTheme,
}

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    handlers: HashMap<Target, Action>,
}

impl Bindings {
    pub fn scan(doc: &Document) -> Result<Self> {
        let mut handlers = HashMap::new();

        for link in doc.select(RESULT_LINK_SELECTOR)? {
            if let Some(url) = link_url(&link) {
                handlers.insert(Target::ResultLink(url.clone()), Action::TrackClick(url));
            }
        }

        for button in doc.select(HEART_BUTTON_SELECTOR)? {
            if let Some(url) = link_url(&button) {
                handlers.insert(Target::HeartButton(url.clone()), heart_action(&button, url));
            }
        }

        for button in doc.select(REMOVE_FAVORITE_SELECTOR)? {
            if let Some(url) = link_url(&button) {
                handlers.insert(
                    Target::RemoveFavorite(url.clone()),
                    Action::RemoveFavorite(url),
                );
            }
        }

        if doc.exists(DROP_ZONE_SELECTOR)? {
            handlers.insert(Target::DropZone, Action::OpenFilePicker);
        }
        if doc.exists(THEME_TOGGLE_SELECTOR)? {
            handlers.insert(Target::ThemeToggle, Action::ToggleTheme);
        }

        Ok(Self { handlers })
    }

    pub fn action_for(&self, target: &Target) -> Option<&Action> {
        self.handlers.get(target)
    }

    pub fn is_bound(&self, target: &Target) -> bool {
        self.handlers.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn link_url(info: &ElementInfo) -> Option<String> {
    info.attr("data-link-url")
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

// Server-rendered buttons may predate the first client render and carry no
// `data-action`; fall back to the favorited class.
fn heart_action(button: &ElementInfo, url: String) -> Action {
    let remove = match button.attr("data-action") {
        Some(action) => action == "remove",
        None => button.has_class("favorited"),
    };
    if remove {
        Action::RemoveFavorite(url)
    } else {
        Action::AddFavorite(url)
    }
}
