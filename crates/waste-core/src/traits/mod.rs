//! Core traits for record storage.

mod store;

pub use store::{HistoryLookup, RecordStore};
