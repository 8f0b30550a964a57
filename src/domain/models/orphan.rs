use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ItemId, PhotoKey};

/// Why a stored object lost its owning item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanReason {
    /// Old photo could not be deleted after a replacement upload
    ReplacedPhoto,
    /// Upload succeeded, insert failed, and the rollback delete failed too
    FailedRollback,
    /// Replacement uploaded but the item could not be saved
    UnsavedReplacement,
}

impl OrphanReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrphanReason::ReplacedPhoto => "replaced_photo",
            OrphanReason::FailedRollback => "failed_rollback",
            OrphanReason::UnsavedReplacement => "unsaved_replacement",
        }
    }
}

impl std::fmt::Display for OrphanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage object awaiting out-of-band cleanup
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanedPhoto {
    pub key: PhotoKey,
    pub reason: OrphanReason,
    pub item_id: Option<ItemId>,
    pub detected_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_error: String,
}

/// Outcome of one cleanup pass over the orphan ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub removed: Vec<PhotoKey>,
    pub still_pending: Vec<PhotoKey>,
}
