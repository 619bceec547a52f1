//! Favorite synchronization between the server, the store and the page.
//!
//! Every operation is a server round-trip first. The store and the document
//! only change once the server has answered `status: "ok"`; any other answer,
//! or a transport failure, is logged and leaves everything as it was.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::Backend;
use crate::dom::Document;
use crate::models::FavoriteAction;
use crate::store::FavoritesStore;
use crate::templates::{
    render_all_from_store, render_section_into, update_all_heart_buttons, FavoritesList,
};

/// What happened to a sync operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server confirmed and local state now matches it.
    Applied,
    /// The server answered with a non-ok status.
    Rejected(String),
    /// The request never produced a usable answer.
    Failed(String),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied)
    }
}

pub struct FavoriteSync<B> {
    backend: Arc<B>,
    store: FavoritesStore,
    list: FavoritesList,
}

impl<B: Backend> FavoriteSync<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            store: FavoritesStore::new(),
            list: FavoritesList::new(),
        }
    }

    pub fn store(&self) -> &FavoritesStore {
        &self.store
    }

    pub fn list(&self) -> &FavoritesList {
        &self.list
    }

    /// Load the favorites list from the server and re-render from it.
    pub async fn initialize(&mut self, doc: &mut Document) -> SyncOutcome {
        let response = match self.backend.get_favorites().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Could not load favorites");
                return SyncOutcome::Failed(e.to_string());
            }
        };

        if !response.is_ok() {
            let reason = response
                .error
                .clone()
                .unwrap_or_else(|| format!("server answered status \"{}\"", response.status));
            warn!(%reason, "Server refused favorites list");
            return SyncOutcome::Rejected(reason);
        }

        self.store
            .replace_all(response.favorites.iter().map(|f| f.link_url.clone()));
        self.list = FavoritesList::from_favorites(&response.favorites, Utc::now());
        info!(count = self.store.len(), "Loaded favorites");

        if let Err(e) = render_all_from_store(doc, &self.store) {
            warn!(error = %e, "Could not render heart buttons");
        }
        self.render_list(doc);
        SyncOutcome::Applied
    }

    /// Favorite `url` once the server accepts it.
    ///
    /// Adding a URL that is already a favorite still asks the server, but
    /// leaves the list entry where it is.
    pub async fn add(&mut self, url: &str, doc: &mut Document) -> SyncOutcome {
        let outcome = self.request(url, FavoriteAction::Add).await;
        if !outcome.is_applied() {
            return outcome;
        }

        if self.store.insert(url) || !self.list.contains(url) {
            self.list.upsert(url, Utc::now());
            self.render_list(doc);
        }
        self.render_hearts(doc, url, true);
        info!(url, "Saved favorite");
        SyncOutcome::Applied
    }

    /// Unfavorite `url` once the server accepts it.
    ///
    /// Shared by the heart button and the favorites panel's remove action.
    pub async fn remove(&mut self, url: &str, doc: &mut Document) -> SyncOutcome {
        let outcome = self.request(url, FavoriteAction::Remove).await;
        if !outcome.is_applied() {
            return outcome;
        }

        self.store.remove(url);
        if self.list.remove(url) {
            self.render_list(doc);
        }
        self.render_hearts(doc, url, false);
        info!(url, "Removed favorite");
        SyncOutcome::Applied
    }

    async fn request(&self, url: &str, action: FavoriteAction) -> SyncOutcome {
        match self.backend.favorite(url, action).await {
            Ok(status) if status.is_ok() => SyncOutcome::Applied,
            Ok(status) => {
                let reason = status.reason();
                warn!(url, ?action, %reason, "Server rejected favorite change");
                SyncOutcome::Rejected(reason)
            }
            Err(e) => {
                warn!(url, ?action, error = %e, "Favorite request failed");
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    fn render_hearts(&self, doc: &mut Document, url: &str, favorited: bool) {
        if let Err(e) = update_all_heart_buttons(doc, url, favorited) {
            warn!(url, error = %e, "Could not render heart buttons");
        }
    }

    fn render_list(&self, doc: &mut Document) {
        if let Err(e) = render_section_into(doc, &self.list) {
            warn!(error = %e, "Could not render favorites section");
        }
    }
}
