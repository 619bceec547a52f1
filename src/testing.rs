//! In-memory backend and page fixtures shared by the unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::api::Backend;
use crate::error::{ClientError, Result};
use crate::models::{ApiStatus, Favorite, FavoriteAction, FavoritesResponse, SearchSubmission};

/// Result rows for `urls`, each with a tracked link and a heart button.
pub fn results_block(urls: &[&str]) -> String {
    let mut html = String::from(r#"<div id="search-results">"#);
    for url in urls {
        html.push_str(&format!(
            r#"<div class="result"><a class="result-link" data-link-url="{url}" href="{url}">{url}</a><button type="button" class="heart-btn" data-link-url="{url}">&#9825;</button></div>"#,
        ));
    }
    html.push_str("</div>");
    html
}

pub fn search_form(query: &str) -> String {
    format!(
        r#"<form id="search-form" method="post" enctype="multipart/form-data"><input type="text" name="query" value="{query}"><div id="drop-zone" class="drop-zone">Drop an image here<input type="file" id="image-input" name="image" accept="image/*" hidden><img id="preview" alt="" style="display: none"></div><button type="submit">Search</button></form>"#
    )
}

/// A complete page with theme toggle, form, results and favorites panel.
pub fn results_page(urls: &[&str]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>PDF Finder</title></head><body id="app-body"><header><label><input type="checkbox" id="mode-toggle-checkbox"> Dark mode</label></header>{form}{results}<section id="favorites-section"><h2>Favorites</h2><p id="favorites-empty" class="empty-state">No favorites yet.</p></section></body></html>"#,
        form = search_form(""),
        results = results_block(urls),
    )
}

/// Backend that keeps favorites in memory and records every call.
pub struct MockBackend {
    page_html: Mutex<String>,
    search_html: Mutex<String>,
    favorites: Mutex<Vec<Favorite>>,
    valid_key: String,
    offline: AtomicBool,
    reject: Mutex<Option<String>>,
    clicks: Mutex<Vec<String>>,
    submissions: Mutex<Vec<SearchSubmission>>,
    favorite_calls: Mutex<Vec<(String, FavoriteAction)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            page_html: Mutex::new(results_page(&[])),
            search_html: Mutex::new(results_page(&[])),
            favorites: Mutex::new(Vec::new()),
            valid_key: "good-key".to_string(),
            offline: AtomicBool::new(false),
            reject: Mutex::new(None),
            clicks: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            favorite_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(self, html: String) -> Self {
        *self.page_html.lock().unwrap() = html;
        self
    }

    pub fn set_search_response(&self, html: String) {
        *self.search_html.lock().unwrap() = html;
    }

    pub fn seed_favorites(&self, urls: &[&str]) {
        let mut favorites = self.favorites.lock().unwrap();
        for url in urls {
            favorites.push(Favorite {
                link_url: url.to_string(),
                saved_at: Some(Utc::now()),
            });
        }
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    pub fn reject_favorites(&self, reason: &str) {
        *self.reject.lock().unwrap() = Some(reason.to_string());
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SearchSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn favorite_calls(&self) -> Vec<(String, FavoriteAction)> {
        self.favorite_calls.lock().unwrap().clone()
    }

    pub fn server_favorites(&self) -> Vec<String> {
        self.favorites
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.link_url.clone())
            .collect()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock backend offline",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn load_page(&self) -> Result<String> {
        self.check_online()?;
        Ok(self.page_html.lock().unwrap().clone())
    }

    async fn submit_search(&self, submission: &SearchSubmission) -> Result<String> {
        self.check_online()?;
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(self.search_html.lock().unwrap().clone())
    }

    async fn favorite(&self, link_url: &str, action: FavoriteAction) -> Result<ApiStatus> {
        self.check_online()?;
        self.favorite_calls
            .lock()
            .unwrap()
            .push((link_url.to_string(), action));
        if let Some(reason) = self.reject.lock().unwrap().as_ref() {
            return Ok(ApiStatus::error(reason));
        }

        let mut favorites = self.favorites.lock().unwrap();
        match action {
            FavoriteAction::Add => {
                if !favorites.iter().any(|f| f.link_url == link_url) {
                    favorites.push(Favorite {
                        link_url: link_url.to_string(),
                        saved_at: Some(Utc::now()),
                    });
                }
            }
            FavoriteAction::Remove => favorites.retain(|f| f.link_url != link_url),
        }
        Ok(ApiStatus::ok())
    }

    async fn get_favorites(&self) -> Result<FavoritesResponse> {
        self.check_online()?;
        // Most recent first, as the server lists them.
        let mut favorites = self.favorites.lock().unwrap().clone();
        favorites.reverse();
        Ok(FavoritesResponse {
            status: "ok".to_string(),
            favorites,
            error: None,
        })
    }

    async fn track_click(&self, link_url: &str) -> Result<()> {
        self.check_online()?;
        self.clicks.lock().unwrap().push(link_url.to_string());
        Ok(())
    }

    async fn set_key(&self, key: &str) -> Result<ApiStatus> {
        self.check_online()?;
        if key == self.valid_key {
            Ok(ApiStatus::ok())
        } else {
            Ok(ApiStatus::error("invalid key"))
        }
    }
}
