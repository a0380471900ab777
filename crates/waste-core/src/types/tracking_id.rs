//! Waste tracking id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A waste tracking id.
///
/// Names one logical waste movement record across all its revisions. Any
/// non-empty string is accepted; stores that derive keys or file names from
/// it are responsible for encoding it.
///
/// # Example
///
/// ```
/// use waste_core::TrackingId;
///
/// let id = TrackingId::new("25KLD3AB").unwrap();
/// assert_eq!(id.as_str(), "25KLD3AB");
/// assert!(TrackingId::new("").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingId(String);

impl TrackingId {
    /// Create a new tracking id.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidInputError::TrackingId {
                value: s,
                reason: "must be non-empty".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the tracking id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackingId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TrackingId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TrackingId> for String {
    fn from(id: TrackingId) -> Self {
        id.0
    }
}

impl AsRef<str> for TrackingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
