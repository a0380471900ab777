//! Revisioned record store trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::repo::{HistoryEntry, Receipt, ReceiptPath, UpdateResult, WasteMovementRecord};
use crate::types::TrackingId;

/// A store of current records plus their append-only history.
///
/// Implementations must apply each mutation and its history append as one
/// atomic step, and must serialize mutations per tracking id so that no two
/// history entries share a `(tracking id, revision)` pair.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record at revision 1 together with its revision 1 history
    /// entry.
    ///
    /// Fails with [`Error::Conflict`](crate::Error::Conflict) if the
    /// tracking id already exists.
    async fn create(
        &self,
        tracking_id: &TrackingId,
        receipt: Receipt,
    ) -> Result<WasteMovementRecord>;

    /// Merge `partial` into the current receipt at `path` and append the
    /// resulting revision to the history.
    ///
    /// An unknown tracking id is not an error; it yields
    /// [`UpdateResult::unmatched`].
    async fn update(
        &self,
        tracking_id: &TrackingId,
        partial: &Value,
        path: &ReceiptPath,
    ) -> Result<UpdateResult>;

    /// Get the current record.
    async fn get(&self, tracking_id: &TrackingId) -> Result<Option<WasteMovementRecord>>;

    /// Get the revision 1 history entry, never a later one.
    async fn get_revision_one(&self, tracking_id: &TrackingId) -> Result<Option<HistoryEntry>>;

    /// All history entries for a tracking id in ascending revision order.
    async fn history(&self, tracking_id: &TrackingId) -> Result<Vec<HistoryEntry>>;
}

/// Read access to the revision 1 history entry of a record.
///
/// This is the only capability authorization needs from storage.
#[async_trait]
pub trait HistoryLookup: Send + Sync {
    /// Returns the revision 1 entry, or `None` if the tracking id has no
    /// history.
    async fn revision_one(&self, tracking_id: &TrackingId) -> Result<Option<HistoryEntry>>;
}

#[async_trait]
impl<T> HistoryLookup for T
where
    T: RecordStore + ?Sized,
{
    async fn revision_one(&self, tracking_id: &TrackingId) -> Result<Option<HistoryEntry>> {
        self.get_revision_one(tracking_id).await
    }
}
