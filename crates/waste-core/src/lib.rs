//! waste-core - Core types and ownership rules for waste movement tracking.
//!
//! A waste movement record is created by one organisation and may only be
//! amended later by that same organisation. Ownership is derived from the
//! API code embedded in the first (revision 1) history entry of a record,
//! resolved through a [`CredentialRegistry`].

pub mod authorization;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod repo;
pub mod response;
pub mod service;
pub mod traits;
pub mod types;

pub use authorization::AuthorizationValidator;
pub use credentials::{CredentialRegistry, OrgApiCode};
pub use error::Error;
pub use memory::MemoryStore;
pub use repo::{HistoryEntry, Receipt, ReceiptPath, UpdateResult, WasteMovementRecord};
pub use response::ErrorResponse;
pub use service::MovementService;
pub use traits::{HistoryLookup, RecordStore};
pub use types::{ApiCode, OrganisationId, TrackingId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
