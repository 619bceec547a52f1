//! Fire-and-forget click beacons for result links.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::Backend;

pub struct ClickTracker<B> {
    backend: Arc<B>,
}

impl<B: Backend + 'static> ClickTracker<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Report a click on `url` in the background.
    ///
    /// Navigation never waits on this; the handle is only for callers that
    /// want to know when the beacon has gone out.
    pub fn track(&self, url: &str) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let url = url.to_string();
        tokio::spawn(async move {
            match backend.track_click(&url).await {
                Ok(()) => debug!(url = %url, "Click recorded"),
                Err(e) => debug!(url = %url, error = %e, "Click beacon failed"),
            }
        })
    }
}
