//! Latest-run cache for status queries.

use tokio::sync::RwLock;

use crate::summary::Summary;

/// Holds the most recent [`Summary`]. Single slot, latest wins.
///
/// Writers swap the whole value under the write lock, so a reader sees
/// either the previous summary or the new one, never a mix. Designed to be
/// wrapped in `Arc` and shared between the monitor loop and the status
/// server.
#[derive(Debug, Default)]
pub struct StatusStore {
    latest: RwLock<Summary>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored summary.
    pub async fn update(&self, summary: Summary) {
        *self.latest.write().await = summary;
    }

    /// Copy of the stored summary; the default summary before any update.
    pub async fn get(&self) -> Summary {
        self.latest.read().await.clone()
    }

    /// Forget the stored summary.
    pub async fn reset(&self) {
        *self.latest.write().await = Summary::default();
    }
}
