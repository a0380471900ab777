//! Record and history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TrackingId;

use super::Receipt;

/// The revision every record starts at. Its history entry defines ownership.
pub const FIRST_REVISION: u32 = 1;

/// The current view of a tracked waste movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteMovementRecord {
    /// The tracking id; unique across records.
    #[serde(rename = "wasteTrackingId")]
    pub tracking_id: TrackingId,

    /// The latest receipt payload.
    pub receipt: Receipt,

    /// Current revision, starting at [`FIRST_REVISION`].
    pub revision: u32,

    /// When revision 1 was written.
    pub created_at: DateTime<Utc>,

    /// When the latest revision was written.
    pub last_updated_at: DateTime<Utc>,
}

impl WasteMovementRecord {
    /// A freshly created record at revision 1.
    pub fn new(tracking_id: TrackingId, receipt: Receipt, now: DateTime<Utc>) -> Self {
        Self {
            tracking_id,
            receipt,
            revision: FIRST_REVISION,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// The next revision of this record carrying `receipt`.
    pub fn amend(&self, receipt: Receipt, now: DateTime<Utc>) -> Self {
        Self {
            tracking_id: self.tracking_id.clone(),
            receipt,
            revision: self.revision + 1,
            created_at: self.created_at,
            last_updated_at: now,
        }
    }

    /// Rebuild the current view from the revision 1 entry and the newest
    /// history entry of a record.
    pub fn from_history(first: &HistoryEntry, latest: HistoryEntry) -> Self {
        Self {
            tracking_id: latest.tracking_id,
            receipt: latest.receipt,
            revision: latest.revision,
            created_at: first.recorded_at,
            last_updated_at: latest.recorded_at,
        }
    }

    /// The history entry recording this revision.
    pub fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            tracking_id: self.tracking_id.clone(),
            revision: self.revision,
            receipt: self.receipt.clone(),
            recorded_at: self.last_updated_at,
        }
    }
}

/// An immutable snapshot of one revision of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "wasteTrackingId")]
    pub tracking_id: TrackingId,
    pub revision: u32,
    pub receipt: Receipt,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Returns true for the revision 1 entry.
    pub fn is_original(&self) -> bool {
        self.revision == FIRST_REVISION
    }
}

/// Outcome of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    /// Number of records matched by tracking id: 0 or 1.
    pub matched_count: u64,

    /// The new revision when a record was matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
}

impl UpdateResult {
    /// No record exists for the tracking id.
    pub fn unmatched() -> Self {
        Self {
            matched_count: 0,
            revision: None,
        }
    }

    /// The record was updated to `revision`.
    pub fn matched(revision: u32) -> Self {
        Self {
            matched_count: 1,
            revision: Some(revision),
        }
    }
}
