//! Data models shared by the page client.
//!
//! Wire types for the backend JSON API plus the small value types that flow
//! between the page controller and its components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Favorites
// ============================================================================

/// A saved result link as reported by `/api/get-favorites`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRequest {
    pub link_url: String,
    pub action: FavoriteAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub link_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetKeyRequest {
    pub key: String,
}

// ============================================================================
// API Responses
// ============================================================================

/// The `{status, error}` envelope every JSON endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(message.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Human-readable reason for a non-ok status.
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("server answered status \"{}\"", self.status))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoritesResponse {
    pub status: String,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FavoritesResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

// ============================================================================
// Upload
// ============================================================================

/// An image file held by the drop zone until the form is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    /// Build a staged file, guessing its MIME type from the file name.
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        let mime_type = mime_guess::from_path(name)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            name: name.to_string(),
            mime_type,
            bytes,
        }
    }
}

/// Form data sent to `/` on submit.
#[derive(Debug, Clone, Default)]
pub struct SearchSubmission {
    pub query: String,
    pub image: Option<StagedFile>,
}

// ============================================================================
// Theme
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored preference. Anything but `"dark"` reads as light.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
