//! Waste movement records, their history and receipt payloads.
//!
//! Storage operations live on [`RecordStore`](crate::RecordStore).

mod receipt;
mod types;

pub use receipt::{Receipt, ReceiptPath};
pub use types::{FIRST_REVISION, HistoryEntry, UpdateResult, WasteMovementRecord};
