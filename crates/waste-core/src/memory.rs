//! In-memory record store.
//!
//! Suitable for tests and single-process embedding. Data is lost on drop.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::repo::{HistoryEntry, Receipt, ReceiptPath, UpdateResult, WasteMovementRecord};
use crate::traits::RecordStore;
use crate::types::TrackingId;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Collections {
    records: HashMap<TrackingId, WasteMovementRecord>,
    history: HashMap<TrackingId, Vec<HistoryEntry>>,
}

/// In-memory record store.
///
/// Both collections sit behind one lock, so a mutation and its history
/// append are never observed separately.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    #[instrument(skip(self, receipt))]
    async fn create(
        &self,
        tracking_id: &TrackingId,
        receipt: Receipt,
    ) -> Result<WasteMovementRecord> {
        let mut inner = self.inner.lock().await;

        if inner.records.contains_key(tracking_id) || inner.history.contains_key(tracking_id) {
            return Err(Error::Conflict {
                tracking_id: tracking_id.clone(),
            });
        }

        let record = WasteMovementRecord::new(tracking_id.clone(), receipt, Utc::now());
        inner
            .history
            .insert(tracking_id.clone(), vec![record.snapshot()]);
        inner.records.insert(tracking_id.clone(), record.clone());

        debug!("Created waste input");

        Ok(record)
    }

    #[instrument(skip(self, partial))]
    async fn update(
        &self,
        tracking_id: &TrackingId,
        partial: &Value,
        path: &ReceiptPath,
    ) -> Result<UpdateResult> {
        let mut inner = self.inner.lock().await;

        let Some(current) = inner.records.get(tracking_id) else {
            return Ok(UpdateResult::unmatched());
        };

        let receipt = current.receipt.merged(path, partial)?;
        let amended = current.amend(receipt, Utc::now());
        let revision = amended.revision;

        inner
            .history
            .entry(tracking_id.clone())
            .or_default()
            .push(amended.snapshot());
        inner.records.insert(tracking_id.clone(), amended);

        debug!(revision, "Updated waste input");

        Ok(UpdateResult::matched(revision))
    }

    async fn get(&self, tracking_id: &TrackingId) -> Result<Option<WasteMovementRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.records.get(tracking_id).cloned())
    }

    async fn get_revision_one(&self, tracking_id: &TrackingId) -> Result<Option<HistoryEntry>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .history
            .get(tracking_id)
            .and_then(|entries| entries.iter().find(|e| e.is_original()))
            .cloned())
    }

    async fn history(&self, tracking_id: &TrackingId) -> Result<Vec<HistoryEntry>> {
        let inner = self.inner.lock().await;
        Ok(inner.history.get(tracking_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn tracking_id(s: &str) -> TrackingId {
        TrackingId::new(s).unwrap()
    }

    fn receipt(code: &str) -> Receipt {
        Receipt::from_movement(json!({ "receivingSiteId": "site-1", "apiCode": code })).unwrap()
    }

    #[tokio::test]
    async fn create_writes_record_and_revision_one() {
        let store = MemoryStore::new();
        let id = tracking_id("MEM1");

        let record = store.create(&id, receipt("asd")).await.unwrap();
        assert_eq!(record.revision, 1);
        assert_eq!(record.created_at, record.last_updated_at);

        let original = store.get_revision_one(&id).await.unwrap().unwrap();
        assert_eq!(original.receipt.api_code().as_str(), "asd");
        assert_eq!(original.recorded_at, record.created_at);
        assert_eq!(store.get(&id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn create_twice_conflicts_and_keeps_original() {
        let store = MemoryStore::new();
        let id = tracking_id("MEM2");

        store.create(&id, receipt("asd")).await.unwrap();
        let err = store.create(&id, receipt("zxc")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        let original = store.get_revision_one(&id).await.unwrap().unwrap();
        assert_eq!(original.receipt.api_code().as_str(), "asd");
        assert_eq!(store.history(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_is_unmatched() {
        let store = MemoryStore::new();
        let result = store
            .update(&tracking_id("MEM3"), &json!({ "apiCode": "asd" }), &ReceiptPath::movement())
            .await
            .unwrap();
        assert_eq!(result, UpdateResult::unmatched());
        assert!(store.history(&tracking_id("MEM3")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn updates_append_history_and_preserve_revision_one() {
        let store = MemoryStore::new();
        let id = tracking_id("MEM4");
        store.create(&id, receipt("asd")).await.unwrap();
        let original = store.get_revision_one(&id).await.unwrap();

        for n in 1..=5u32 {
            let result = store
                .update(
                    &id,
                    &json!({ "receiverReference": format!("ref-{n}"), "apiCode": "asd" }),
                    &ReceiptPath::movement(),
                )
                .await
                .unwrap();
            assert_eq!(result, UpdateResult::matched(n + 1));
        }

        let current = store.get(&id).await.unwrap().unwrap();
        assert_eq!(current.revision, 6);
        assert_eq!(current.receipt.movement()["receiverReference"], "ref-5");
        assert_eq!(current.receipt.movement()["receivingSiteId"], "site-1");

        let history = store.history(&id).await.unwrap();
        let revisions: Vec<u32> = history.iter().map(|e| e.revision).collect();
        assert_eq!(revisions, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(store.get_revision_one(&id).await.unwrap(), original);
    }

    #[tokio::test]
    async fn invalid_merge_leaves_record_untouched() {
        let store = MemoryStore::new();
        let id = tracking_id("MEM5");
        store.create(&id, receipt("asd")).await.unwrap();

        let err = store
            .update(&id, &json!({ "apiCode": 42 }), &ReceiptPath::movement())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(store.get(&id).await.unwrap().unwrap().revision, 1);
        assert_eq!(store.history(&id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let id = tracking_id("RACE1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                tokio::spawn(async move { store.create(&id, receipt("asd")).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(Error::Conflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.history(&id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_get_distinct_revisions() {
        let store = Arc::new(MemoryStore::new());
        let id = tracking_id("RACE2");
        store.create(&id, receipt("asd")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = Arc::clone(&store);
                let id = id.clone();
                tokio::spawn(async move {
                    store
                        .update(&id, &json!({ "seq": n }), &ReceiptPath::movement())
                        .await
                })
            })
            .collect();

        let mut revisions = Vec::new();
        for handle in handles {
            revisions.push(handle.await.unwrap().unwrap().revision.unwrap());
        }
        revisions.sort_unstable();
        assert_eq!(revisions, (2..=17).collect::<Vec<u32>>());

        let history: Vec<u32> = store
            .history(&id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.revision)
            .collect();
        assert_eq!(history, (1..=17).collect::<Vec<u32>>());
    }
}
