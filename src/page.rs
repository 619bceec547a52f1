//! The page controller.
//!
//! `Page` owns every piece of client state: the document, the favorites store
//! and list (through the sync client), the drop zone, the theme and the event
//! bindings. User events come in through its methods, which take `&mut self`,
//! so one event is fully handled before the next starts.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::Backend;
use crate::bindings::{Action, Bindings, Target};
use crate::dom::Document;
use crate::error::Result;
use crate::form::{self, SubmitOutcome};
use crate::models::{SearchSubmission, StagedFile, Theme};
use crate::store::FavoritesStore;
use crate::sync::{FavoriteSync, SyncOutcome};
use crate::templates::{heart_states, FavoritesList, HeartState};
use crate::theme::{LocalStorage, ThemeToggle};
use crate::tracker::ClickTracker;
use crate::upload::DropZone;

/// Result of activating a target.
#[derive(Debug)]
pub enum ClickOutcome {
    /// A result link: the browser navigates, the beacon goes out on its own.
    Navigate {
        url: String,
        beacon: JoinHandle<()>,
    },
    Favorite(SyncOutcome),
    /// The host should open the file picker for the hidden file input.
    OpenFilePicker,
    ThemeChanged(Theme),
    /// Nothing on the page is bound to that target.
    Unbound,
}

pub struct Page<B: Backend + 'static> {
    backend: Arc<B>,
    document: Document,
    sync: FavoriteSync<B>,
    tracker: ClickTracker<B>,
    theme: ThemeToggle,
    drop_zone: DropZone,
    bindings: Bindings,
}

impl<B: Backend + 'static> Page<B> {
    /// Wrap already-fetched page HTML. Nothing is applied until `boot`.
    pub fn new(backend: Arc<B>, storage: LocalStorage, html: impl Into<String>) -> Self {
        Self {
            sync: FavoriteSync::new(Arc::clone(&backend)),
            tracker: ClickTracker::new(Arc::clone(&backend)),
            backend,
            document: Document::new(html),
            theme: ThemeToggle::load(storage),
            drop_zone: DropZone::new(),
            bindings: Bindings::default(),
        }
    }

    /// Fetch `/` and run the load sequence.
    pub async fn load(backend: Arc<B>, storage: LocalStorage) -> Result<Self> {
        let html = backend.load_page().await?;
        let mut page = Self::new(backend, storage, html);
        page.boot().await;
        Ok(page)
    }

    /// Apply the stored theme, bind, then pull favorites and render them.
    pub async fn boot(&mut self) -> SyncOutcome {
        if let Err(e) = self.theme.apply(&mut self.document) {
            warn!(error = %e, "Could not apply theme");
        }
        self.rebind();
        let outcome = self.sync.initialize(&mut self.document).await;
        self.rebind();
        outcome
    }

    /// Replace the whole page with a fresh `GET /` and boot it.
    pub async fn reload(&mut self) -> Result<()> {
        let html = self.backend.load_page().await?;
        self.document.replace_all(html);
        self.drop_zone.reset();
        self.boot().await;
        Ok(())
    }

    fn rebind(&mut self) {
        match Bindings::scan(&self.document) {
            Ok(bindings) => self.bindings = bindings,
            Err(e) => {
                warn!(error = %e, "Could not scan page for bindings");
                self.bindings = Bindings::default();
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &FavoritesStore {
        self.sync.store()
    }

    pub fn favorites(&self) -> &FavoritesList {
        self.sync.list()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.drop_zone.staged()
    }

    pub fn is_drop_hovering(&self) -> bool {
        self.drop_zone.is_hovering()
    }

    pub fn heart_states(&self, url: &str) -> Vec<HeartState> {
        heart_states(&self.document, url).unwrap_or_default()
    }

    pub fn query(&self) -> Option<String> {
        form::query(&self.document).ok().flatten()
    }

    pub fn result_links(&self) -> Vec<String> {
        form::result_links(&self.document).unwrap_or_default()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Activate `target` through whatever the current bindings say it does.
    pub async fn click(&mut self, target: &Target) -> ClickOutcome {
        let Some(action) = self.bindings.action_for(target).cloned() else {
            return ClickOutcome::Unbound;
        };

        match action {
            Action::TrackClick(url) => {
                let beacon = self.tracker.track(&url);
                ClickOutcome::Navigate { url, beacon }
            }
            Action::AddFavorite(url) => ClickOutcome::Favorite(self.add_favorite(&url).await),
            Action::RemoveFavorite(url) => {
                ClickOutcome::Favorite(self.remove_favorite(&url).await)
            }
            Action::OpenFilePicker => ClickOutcome::OpenFilePicker,
            Action::ToggleTheme => {
                let dark = self.theme.theme() != Theme::Dark;
                if let Err(e) = self.set_theme_checked(dark) {
                    warn!(error = %e, "Could not store theme preference");
                }
                ClickOutcome::ThemeChanged(self.theme.theme())
            }
        }
    }

    pub async fn add_favorite(&mut self, url: &str) -> SyncOutcome {
        let outcome = self.sync.add(url, &mut self.document).await;
        if outcome.is_applied() {
            self.rebind();
        }
        outcome
    }

    pub async fn remove_favorite(&mut self, url: &str) -> SyncOutcome {
        let outcome = self.sync.remove(url, &mut self.document).await;
        if outcome.is_applied() {
            self.rebind();
        }
        outcome
    }

    /// The theme checkbox changed. Returns false when the page has none.
    pub fn set_theme_checked(&mut self, checked: bool) -> Result<bool> {
        self.theme.checkbox_changed(checked, &mut self.document)
    }

    /// Set the theme directly, whether or not the page shows a toggle.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme.set_theme(theme, &mut self.document)
    }

    pub fn drag_over(&mut self) -> Result<bool> {
        self.drop_zone.drag_over(&mut self.document)
    }

    pub fn drag_leave(&mut self) -> Result<()> {
        self.drop_zone.drag_leave(&mut self.document)
    }

    pub fn drop_files(&mut self, files: Vec<StagedFile>) -> Result<bool> {
        self.drop_zone.drop_files(files, &mut self.document)
    }

    pub fn file_input_changed(&mut self, files: Vec<StagedFile>) -> Result<bool> {
        self.drop_zone.file_input_changed(files, &mut self.document)
    }

    pub fn set_query(&mut self, query: &str) -> Result<bool> {
        form::set_query(&mut self.document, query)
    }

    /// Submit the search form in place.
    ///
    /// On success the returned regions are spliced in, the staged image is
    /// dropped with the old form, and bindings and favorites are rebuilt.
    pub async fn submit_search(&mut self) -> SubmitOutcome {
        let submission = SearchSubmission {
            query: self.query().unwrap_or_default(),
            image: self.drop_zone.staged().cloned(),
        };

        let outcome = form::submit(self.backend.as_ref(), &mut self.document, &submission).await;
        if let SubmitOutcome::Spliced(_) = &outcome {
            self.drop_zone.reset();
            self.rebind();
            self.sync.initialize(&mut self.document).await;
            self.rebind();
        }
        outcome
    }

    /// Store a new API key; the server wants a full reload afterwards.
    pub async fn set_key(&mut self, key: &str) -> SyncOutcome {
        match self.backend.set_key(key).await {
            Ok(status) if status.is_ok() => {
                info!("API key accepted, reloading");
                match self.reload().await {
                    Ok(()) => SyncOutcome::Applied,
                    Err(e) => {
                        warn!(error = %e, "Reload after key change failed");
                        SyncOutcome::Failed(e.to_string())
                    }
                }
            }
            Ok(status) => {
                let reason = status.reason();
                warn!(%reason, "Server rejected API key");
                SyncOutcome::Rejected(reason)
            }
            Err(e) => {
                warn!(error = %e, "Key request failed");
                SyncOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;
