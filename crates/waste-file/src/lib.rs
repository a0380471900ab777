//! waste-file - Filesystem-backed revisioned record store.

mod store;

pub use store::FileStore;
