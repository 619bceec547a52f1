//! PDF Finder page client - re-exports for testing and external use.
//!
//! A headless implementation of the PDF search page's client logic: theme
//! preference, image drop zone, favorites kept in sync with the server, and
//! in-place search form submission. The page is held as an HTML document and
//! driven through `page::Page`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub mod api;
pub mod bindings;
pub mod dom;
pub mod error;
pub mod form;
pub mod models;
pub mod page;
pub mod store;
pub mod sync;
pub mod templates;
pub mod theme;
pub mod timefmt;
pub mod tracker;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_PREFS_PATH: &str = ".pdf_finder_prefs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Local storage key holding `"dark"` or `"light"`.
pub const THEME_STORAGE_KEY: &str = "pdfFinderMode";

// Backend endpoints
pub const HOME_PATH: &str = "/";
pub const SET_KEY_PATH: &str = "/api/set-key";
pub const FAVORITE_PATH: &str = "/api/favorite";
pub const GET_FAVORITES_PATH: &str = "/api/get-favorites";
pub const CLICK_PATH: &str = "/api/click";

// Page regions replaced on form submission
pub const SEARCH_FORM_ID: &str = "search-form";
pub const SEARCH_RESULTS_ID: &str = "search-results";
pub const FAVORITES_SECTION_ID: &str = "favorites-section";

// Element selectors
pub const APP_BODY_SELECTOR: &str = "#app-body";
pub const THEME_TOGGLE_SELECTOR: &str = "#mode-toggle-checkbox";
pub const QUERY_INPUT_SELECTOR: &str = r#"#search-form input[name="query"]"#;
pub const DROP_ZONE_SELECTOR: &str = "#drop-zone";
pub const FILE_INPUT_SELECTOR: &str = "#image-input";
pub const PREVIEW_SELECTOR: &str = "#preview";
pub const RESULT_LINK_SELECTOR: &str = "a.result-link[data-link-url]";
pub const HEART_BUTTON_SELECTOR: &str = "button.heart-btn[data-link-url]";
pub const REMOVE_FAVORITE_SELECTOR: &str = "button.remove-favorite[data-link-url]";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub prefs_path: PathBuf,
    pub request_timeout: Duration,
}

impl Config {
    /// `PDF_FINDER_URL`, `PDF_FINDER_PREFS` and `PDF_FINDER_TIMEOUT_SECS`,
    /// each falling back to its default when unset.
    pub fn from_env() -> error::Result<Self> {
        let base_url = env::var("PDF_FINDER_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let prefs_path =
            env::var("PDF_FINDER_PREFS").unwrap_or_else(|_| DEFAULT_PREFS_PATH.to_string());
        let timeout_secs = match env::var("PDF_FINDER_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                error::ClientError::Config(format!(
                    "PDF_FINDER_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(&base_url, PathBuf::from(prefs_path), Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: &str, prefs_path: PathBuf, request_timeout: Duration) -> error::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(error::ClientError::Config(format!(
                "Backend URL must be http or https: {}",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            prefs_path,
            request_timeout,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Re-export commonly used types
pub use api::{Backend, HttpBackend};
pub use bindings::{Action, Bindings, Target};
pub use dom::{extract_fragments, Document, ElementInfo};
pub use error::{ClientError, Result};
pub use form::{splice_fragments, SpliceReport, SubmitOutcome};
pub use models::{
    ApiStatus, Favorite, FavoriteAction, FavoritesResponse, SearchSubmission, StagedFile, Theme,
};
pub use page::{ClickOutcome, Page};
pub use store::FavoritesStore;
pub use sync::{FavoriteSync, SyncOutcome};
pub use templates::{FavoriteEntry, FavoritesList, HeartState};
pub use theme::{LocalStorage, ThemeToggle};
pub use timefmt::{format_relative, format_relative_now};
pub use tracker::ClickTracker;
pub use upload::{preview_data_url, DropZone};
