//! Error responses surfaced to callers.
//!
//! Maps each [`Error`] kind to a status code and the
//! `{ statusCode, error, message }` body returned by the request layer.

use serde::{Deserialize, Serialize};

use crate::Error;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status_code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error: error.into(),
            message: message.into(),
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(e) => Self::new(STATUS_BAD_REQUEST, "ValidationError", e.to_string()),
            Error::InvalidInput(e) => {
                Self::new(STATUS_BAD_REQUEST, "ValidationError", e.to_string())
            }
            Error::NotFound { tracking_id } => Self::new(
                STATUS_NOT_FOUND,
                "Not Found",
                format!("Waste input with ID {} not found", tracking_id),
            ),
            Error::Conflict { tracking_id } => Self::new(
                STATUS_CONFLICT,
                "Conflict",
                format!("Waste input with ID {} already exists", tracking_id),
            ),
            Error::Configuration(e) => Self::new(
                STATUS_INTERNAL_SERVER_ERROR,
                "ConfigurationError",
                e.to_string(),
            ),
            Error::Storage(e) => Self::new(STATUS_INTERNAL_SERVER_ERROR, "Error", e.to_string()),
        }
    }
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}
