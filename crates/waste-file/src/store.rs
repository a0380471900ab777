//! Filesystem storage for waste inputs and their history.
//!
//! Layout under the store root:
//!
//! ```text
//! waste-inputs/<id>.json                     current record
//! waste-inputs-history/<id>/<revision>.json  one file per revision
//! locks/<id>.lock                            per-record lock
//! ```
//!
//! `<id>` is the percent-encoded tracking id. History is authoritative: the
//! current record file is derived from it and is rebuilt when it falls
//! behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use waste_core::error::StorageError;
use waste_core::repo::{
    FIRST_REVISION, HistoryEntry, Receipt, ReceiptPath, UpdateResult, WasteMovementRecord,
};
use waste_core::traits::RecordStore;
use waste_core::types::TrackingId;
use waste_core::{Error, Result};

/// Bytes kept literal in file names. `.` is encoded, so no name can be
/// `.`, `..` or hidden.
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

fn map_io(err: io::Error) -> Error {
    Error::Storage(StorageError::from(err))
}

fn map_json(err: serde_json::Error) -> Error {
    Error::Storage(StorageError::from(err))
}

fn integrity(tracking_id: &TrackingId, reason: String) -> Error {
    StorageError::Integrity {
        tracking_id: tracking_id.clone(),
        reason,
    }
    .into()
}

/// Remove a leftover file, logging anything but its absence.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(error = %e, path = %path.display(), "Failed to remove file");
    }
}

/// Lock on one tracking id, released on drop.
struct RecordLock {
    file: File,
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "Failed to release record lock");
        }
    }
}

/// Filesystem-backed record store.
///
/// Mutations of one tracking id hold an exclusive file lock and reads hold
/// a shared one, which also applies across processes sharing the same
/// root. History entries are published with `hard_link` from a synced temp
/// file, so a revision is either absent or complete and can never be
/// written twice.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn file_name(tracking_id: &TrackingId) -> String {
        utf8_percent_encode(tracking_id.as_str(), FILE_NAME).to_string()
    }

    fn record_path(&self, tracking_id: &TrackingId) -> PathBuf {
        self.root
            .join("waste-inputs")
            .join(format!("{}.json", Self::file_name(tracking_id)))
    }

    fn history_dir(&self, tracking_id: &TrackingId) -> PathBuf {
        self.root
            .join("waste-inputs-history")
            .join(Self::file_name(tracking_id))
    }

    fn history_path(&self, tracking_id: &TrackingId, revision: u32) -> PathBuf {
        self.history_dir(tracking_id)
            .join(format!("{}.json", revision))
    }

    fn open_lock(&self, tracking_id: &TrackingId) -> Result<File> {
        let locks_dir = self.root.join("locks");
        fs::create_dir_all(&locks_dir).map_err(map_io)?;

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(locks_dir.join(format!("{}.lock", Self::file_name(tracking_id))))
            .map_err(map_io)
    }

    fn lock_exclusive(&self, tracking_id: &TrackingId) -> Result<RecordLock> {
        let file = self.open_lock(tracking_id)?;
        file.lock_exclusive().map_err(map_io)?;
        Ok(RecordLock { file })
    }

    fn lock_shared(&self, tracking_id: &TrackingId) -> Result<RecordLock> {
        let file = self.open_lock(tracking_id)?;
        FileExt::lock_shared(&file).map_err(map_io)?;
        Ok(RecordLock { file })
    }

    fn write_synced(path: &Path, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(content.as_bytes())?;
        file.sync_data()
    }

    /// Publish a document that must not exist yet.
    ///
    /// Fails with `AlreadyExists` if it does.
    fn publish_new(path: &Path, content: &str) -> io::Result<()> {
        let Some(dir) = path.parent() else {
            return Err(io::Error::other("document path has no parent"));
        };
        fs::create_dir_all(dir)?;

        let temp_path = dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        let result =
            Self::write_synced(&temp_path, content).and_then(|()| fs::hard_link(&temp_path, path));
        discard(&temp_path);

        result
    }

    /// Replace a document atomically.
    fn write_replace<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(map_json)?;
        let Some(dir) = path.parent() else {
            return Err(map_io(io::Error::other("document path has no parent")));
        };
        fs::create_dir_all(dir).map_err(map_io)?;

        let temp_path = dir.join(format!(".{}.tmp", Uuid::new_v4().simple()));
        let result = Self::write_synced(&temp_path, &content)
            .and_then(|()| fs::rename(&temp_path, path));
        if result.is_err() {
            discard(&temp_path);
        }

        result.map_err(map_io)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(e)),
        };

        serde_json::from_str(&content).map(Some).map_err(map_json)
    }

    /// Revisions that have a history file, ascending.
    fn revisions(&self, tracking_id: &TrackingId) -> Result<Vec<u32>> {
        let read_dir = match fs::read_dir(self.history_dir(tracking_id)) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_io(e)),
        };

        let mut revisions = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(map_io)?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(revision) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            {
                revisions.push(revision);
            }
        }
        revisions.sort_unstable();

        Ok(revisions)
    }

    fn read_entry(&self, tracking_id: &TrackingId, revision: u32) -> Result<Option<HistoryEntry>> {
        let Some(entry) =
            Self::read_json::<HistoryEntry>(&self.history_path(tracking_id, revision))?
        else {
            return Ok(None);
        };

        if entry.tracking_id != *tracking_id || entry.revision != revision {
            return Err(integrity(
                tracking_id,
                format!(
                    "history file for revision {} holds revision {} of {}",
                    revision, entry.revision, entry.tracking_id
                ),
            ));
        }

        Ok(Some(entry))
    }

    /// The current record as history defines it.
    ///
    /// A record file that is missing or older than the newest history entry
    /// is left over from an interrupted mutation; the record is rebuilt from
    /// history instead. Callers must hold the record lock.
    fn current(&self, tracking_id: &TrackingId) -> Result<Option<WasteMovementRecord>> {
        let stored = Self::read_json::<WasteMovementRecord>(&self.record_path(tracking_id))?;

        let Some(&latest) = self.revisions(tracking_id)?.last() else {
            return Ok(stored);
        };

        if let Some(record) = stored
            && record.revision >= latest
        {
            return Ok(Some(record));
        }

        let first = self
            .read_entry(tracking_id, FIRST_REVISION)?
            .ok_or_else(|| integrity(tracking_id, "history has no revision 1".to_string()))?;
        let newest = self.read_entry(tracking_id, latest)?.ok_or_else(|| {
            integrity(tracking_id, format!("history revision {} vanished", latest))
        })?;

        warn!(
            tracking_id = %tracking_id,
            revision = latest,
            "Record file is behind history; rebuilding from history"
        );

        Ok(Some(WasteMovementRecord::from_history(&first, newest)))
    }

    /// Publish the history entry for `record`, then write it as the current
    /// record. The history entry is removed again if the record cannot be
    /// written.
    ///
    /// Returns false if a history entry for this revision already exists.
    fn commit(&self, record: &WasteMovementRecord) -> Result<bool> {
        let history_path = self.history_path(&record.tracking_id, record.revision);
        let content = serde_json::to_string_pretty(&record.snapshot()).map_err(map_json)?;

        match Self::publish_new(&history_path, &content) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(map_io(e)),
        }

        if let Err(e) = Self::write_replace(&self.record_path(&record.tracking_id), record) {
            discard(&history_path);
            return Err(e);
        }

        Ok(true)
    }
}

#[async_trait]
impl RecordStore for FileStore {
    #[instrument(skip(self, receipt))]
    async fn create(
        &self,
        tracking_id: &TrackingId,
        receipt: Receipt,
    ) -> Result<WasteMovementRecord> {
        let _lock = self.lock_exclusive(tracking_id)?;

        let conflict = || Error::Conflict {
            tracking_id: tracking_id.clone(),
        };

        if self.record_path(tracking_id).exists() || !self.revisions(tracking_id)?.is_empty() {
            return Err(conflict());
        }

        let record = WasteMovementRecord::new(tracking_id.clone(), receipt, Utc::now());

        if !self.commit(&record)? {
            return Err(conflict());
        }

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
        let _lock = self.lock_exclusive(tracking_id)?;

        let Some(current) = self.current(tracking_id)? else {
            return Ok(UpdateResult::unmatched());
        };

        let receipt = current.receipt.merged(path, partial)?;
        let amended = current.amend(receipt, Utc::now());

        if !self.commit(&amended)? {
            return Err(integrity(
                tracking_id,
                format!("revision {} already recorded", amended.revision),
            ));
        }

        debug!(revision = amended.revision, "Updated waste input");

        Ok(UpdateResult::matched(amended.revision))
    }

    #[instrument(skip(self))]
    async fn get(&self, tracking_id: &TrackingId) -> Result<Option<WasteMovementRecord>> {
        let _lock = self.lock_shared(tracking_id)?;
        self.current(tracking_id)
    }

    #[instrument(skip(self))]
    async fn get_revision_one(&self, tracking_id: &TrackingId) -> Result<Option<HistoryEntry>> {
        let _lock = self.lock_shared(tracking_id)?;
        self.read_entry(tracking_id, FIRST_REVISION)
    }

    #[instrument(skip(self))]
    async fn history(&self, tracking_id: &TrackingId) -> Result<Vec<HistoryEntry>> {
        let _lock = self.lock_shared(tracking_id)?;

        let revisions = self.revisions(tracking_id)?;
        let mut entries = Vec::with_capacity(revisions.len());
        for revision in revisions {
            if let Some(entry) = self.read_entry(tracking_id, revision)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}
