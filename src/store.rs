//! In-memory mirror of the server's favorite set.
//!
//! The store is owned by the sync client and only mutated after the server
//! confirms a change. Renderers read it synchronously; anything that wants to
//! react to changes can `subscribe()` and watch the revision counter.

use std::collections::HashSet;
use tokio::sync::watch;

#[derive(Debug)]
pub struct FavoritesStore {
    urls: HashSet<String>,
    revision: watch::Sender<u64>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            urls: HashSet::new(),
            revision,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Snapshot of the favorited URLs, sorted for stable output.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.iter().cloned().collect();
        urls.sort();
        urls
    }

    /// Current revision. Bumped on every mutation that changes membership.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receive the revision number each time membership changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Returns true if `url` was not already present.
    pub fn insert(&mut self, url: &str) -> bool {
        let added = self.urls.insert(url.to_string());
        if added {
            self.bump();
        }
        added
    }

    /// Returns true if `url` was present.
    pub fn remove(&mut self, url: &str) -> bool {
        let removed = self.urls.remove(url);
        if removed {
            self.bump();
        }
        removed
    }

    /// Replace the whole set, as after a full list refresh.
    pub fn replace_all<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        let next: HashSet<String> = urls.into_iter().collect();
        if next != self.urls {
            self.urls = next;
            self.bump();
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for FavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}
