//! Backend contract and its HTTP implementation.
//!
//! The page talks to the server only through `Backend`, which keeps the sync
//! and page logic testable against an in-memory backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::Result;
use crate::models::{
    ApiStatus, ClickRequest, FavoriteAction, FavoriteRequest, FavoritesResponse,
    SearchSubmission, SetKeyRequest,
};
use crate::{
    Config, CLICK_PATH, FAVORITE_PATH, GET_FAVORITES_PATH, HOME_PATH, SET_KEY_PATH,
};

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /`: the full page.
    async fn load_page(&self) -> Result<String>;

    /// `POST /` with the search form as multipart: the full result page.
    async fn submit_search(&self, submission: &SearchSubmission) -> Result<String>;

    /// `POST /api/favorite`.
    async fn favorite(&self, link_url: &str, action: FavoriteAction) -> Result<ApiStatus>;

    /// `GET /api/get-favorites`.
    async fn get_favorites(&self) -> Result<FavoritesResponse>;

    /// `POST /api/click`. The response body is ignored.
    async fn track_click(&self, link_url: &str) -> Result<()>;

    /// `POST /api/set-key`.
    async fn set_key(&self, key: &str) -> Result<ApiStatus>;
}

// ============================================================================
// HTTP Backend
// ============================================================================

pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        // The cookie store carries the server session between calls, the same
        // way the browser would.
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }
}

/// Decode a JSON body regardless of HTTP status; the server reports logical
/// errors in the body.
async fn json_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn load_page(&self) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint(HOME_PATH)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn submit_search(&self, submission: &SearchSubmission) -> Result<String> {
        let mut form = Form::new().text("query", submission.query.clone());
        if let Some(image) = &submission.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.name.clone())
                .mime_str(&image.mime_type)?;
            form = form.part("image", part);
        }

        let response = self
            .client
            .post(self.endpoint(HOME_PATH)?)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn favorite(&self, link_url: &str, action: FavoriteAction) -> Result<ApiStatus> {
        let body = FavoriteRequest {
            link_url: link_url.to_string(),
            action,
        };
        let response = self
            .client
            .post(self.endpoint(FAVORITE_PATH)?)
            .json(&body)
            .send()
            .await?;
        json_body(response).await
    }

    async fn get_favorites(&self) -> Result<FavoritesResponse> {
        let response = self
            .client
            .get(self.endpoint(GET_FAVORITES_PATH)?)
            .send()
            .await?;
        json_body(response).await
    }

    async fn track_click(&self, link_url: &str) -> Result<()> {
        let body = ClickRequest {
            link_url: link_url.to_string(),
        };
        self.client
            .post(self.endpoint(CLICK_PATH)?)
            .json(&body)
            .send()
            .await?;
        Ok(())
    }

    async fn set_key(&self, key: &str) -> Result<ApiStatus> {
        let body = SetKeyRequest {
            key: key.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint(SET_KEY_PATH)?)
            .json(&body)
            .send()
            .await?;
        json_body(response).await
    }
}
