use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    models::{OrphanReason, OrphanedPhoto},
    value_objects::{ItemId, PhotoKey},
};

/// In-process record of storage objects no item references anymore
#[derive(Clone, Default)]
pub struct OrphanLedger {
    entries: Arc<RwLock<HashMap<PhotoKey, OrphanedPhoto>>>,
}

impl OrphanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an orphan. Re-recording a known key only refreshes its last error.
    pub async fn record(
        &self,
        key: PhotoKey,
        reason: OrphanReason,
        item_id: Option<ItemId>,
        last_error: String,
    ) {
        let mut entries = self.entries.write().await;

        entries
            .entry(key.clone())
            .and_modify(|existing| existing.last_error = last_error.clone())
            .or_insert_with(|| OrphanedPhoto {
                key,
                reason,
                item_id,
                detected_at: Utc::now(),
                attempts: 0,
                last_error,
            });
    }

    /// Pending orphans, oldest first
    pub async fn pending(&self) -> Vec<OrphanedPhoto> {
        let entries = self.entries.read().await;

        let mut pending: Vec<OrphanedPhoto> = entries.values().cloned().collect();
        pending.sort_by(|a, b| {
            a.detected_at
                .cmp(&b.detected_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        pending
    }

    /// Forget an orphan once its object is gone
    pub async fn resolve(&self, key: &PhotoKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Count a failed cleanup attempt
    pub async fn mark_failed(&self, key: &PhotoKey, error: String) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.attempts += 1;
            entry.last_error = error;
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
