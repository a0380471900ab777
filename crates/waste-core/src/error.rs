//! Error types for waste movement tracking.
//!
//! A single [`Error`] type with explicit variants for authorization
//! failures, missing or conflicting records, configuration problems,
//! storage failures and malformed input.

use thiserror::Error;

use crate::types::TrackingId;

/// The unified error type for waste-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request failed an authorization rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No current record exists for the tracking id.
    #[error("waste input {tracking_id} not found")]
    NotFound { tracking_id: TrackingId },

    /// A record already exists for the tracking id.
    #[error("waste input {tracking_id} already exists")]
    Conflict { tracking_id: TrackingId },

    /// The credential configuration could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed identifiers or payloads.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Authorization failures.
///
/// The messages are part of the external contract and are reproduced
/// verbatim in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The presented API code does not resolve to an organisation.
    #[error("apiCode must be valid")]
    InvalidApiCode,

    /// No revision 1 history entry exists for the tracking id.
    #[error("wasteTrackingId must be valid")]
    InvalidTrackingId,

    /// The presented API code belongs to a different organisation than the
    /// one that created the record.
    #[error(
        "apiCode must relate to the same Organisation that created the original waste item record"
    )]
    OrganisationMismatch,
}

/// Credential list decoding errors. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The value is not valid base64.
    #[error("org api codes are not valid base64: {reason}")]
    Encoding { reason: String },

    /// The decoded bytes are not UTF-8.
    #[error("org api codes are not valid UTF-8")]
    Utf8,

    /// The decoded list is empty.
    #[error("org api codes are empty")]
    Empty,

    /// A segment is not a single `apiCode=organisationId` pair.
    #[error("malformed org api code entry at position {position}: {reason}")]
    MalformedPair { position: usize, reason: String },
}

/// Backing store failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or device failure.
    #[error("IO error: {message}")]
    Io { message: String },

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Stored data violates a store invariant.
    #[error("integrity violation for {tracking_id}: {reason}")]
    Integrity {
        tracking_id: TrackingId,
        reason: String,
    },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid tracking id format.
    #[error("invalid wasteTrackingId '{value}': {reason}")]
    TrackingId { value: String, reason: String },

    /// Invalid organisation id.
    #[error("invalid organisation id '{value}': {reason}")]
    OrganisationId { value: String, reason: String },

    /// Invalid receipt payload.
    #[error("invalid receipt: {reason}")]
    Receipt { reason: String },

    /// Invalid receipt path.
    #[error("invalid receipt path '{value}': {reason}")]
    ReceiptPath { value: String, reason: String },
}
