//! Light/dark theme preference.
//!
//! The preference lives in a small sled tree standing in for the browser's
//! local storage, under the same key the page has always used.

use std::path::Path;
use tracing::warn;

use crate::dom::{add_class, remove_class, Document};
use crate::error::Result;
use crate::models::Theme;
use crate::{APP_BODY_SELECTOR, THEME_STORAGE_KEY, THEME_TOGGLE_SELECTOR};

const LOCAL_STORAGE_TREE: &str = "local_storage";
const DARK_CLASS: &str = "dark-mode";

// ============================================================================
// Local Storage
// ============================================================================

/// String key/value storage that persists across runs.
#[derive(Clone)]
pub struct LocalStorage {
    // Held so the database outlives every handle to its tree.
    _db: sled::Db,
    tree: sled::Tree,
}

impl LocalStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Throwaway storage that disappears when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self> {
        let tree = db.open_tree(LOCAL_STORAGE_TREE)?;
        Ok(Self { _db: db, tree })
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .tree
            .get(key.as_bytes())?
            .map(|v| String::from_utf8_lossy(&v).into_owned()))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}

// ============================================================================
// Theme Toggle
// ============================================================================

pub struct ThemeToggle {
    storage: LocalStorage,
    theme: Theme,
}

impl ThemeToggle {
    /// Read the stored preference. Missing or unreadable means light.
    pub fn load(storage: LocalStorage) -> Self {
        let theme = match storage.get_item(THEME_STORAGE_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::Light,
            Err(e) => {
                warn!(error = %e, "Could not read theme preference");
                Theme::Light
            }
        };
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Reflect the current theme on the page root and the toggle checkbox.
    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        let dark = self.theme == Theme::Dark;
        doc.rewrite(APP_BODY_SELECTOR, |el| {
            if dark {
                add_class(el, DARK_CLASS)
            } else {
                remove_class(el, DARK_CLASS)
            }
        })?;
        doc.rewrite(THEME_TOGGLE_SELECTOR, |el| {
            if dark {
                el.set_attribute("checked", "")?;
            } else {
                el.remove_attribute("checked");
            }
            Ok(())
        })
    }

    /// The checkbox changed. Returns false, doing nothing, when the page has
    /// no toggle.
    pub fn checkbox_changed(&mut self, checked: bool, doc: &mut Document) -> Result<bool> {
        if !doc.exists(THEME_TOGGLE_SELECTOR)? {
            return Ok(false);
        }
        self.set_theme(if checked { Theme::Dark } else { Theme::Light }, doc)?;
        Ok(true)
    }

    /// Switch to `theme`, persisting it and updating the page.
    pub fn set_theme(&mut self, theme: Theme, doc: &mut Document) -> Result<()> {
        self.theme = theme;
        self.apply(doc)?;
        self.storage.set_item(THEME_STORAGE_KEY, theme.as_str())
    }
}
