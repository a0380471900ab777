//! API code credential type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An API code presented by an external organisation.
///
/// API codes are opaque credentials. Any string may be presented; whether
/// it is valid is decided by resolving it against a
/// [`CredentialRegistry`](crate::CredentialRegistry).
///
/// # Security
///
/// - Never displayed in Debug output
/// - Does not implement `Display`, so it cannot end up in log fields by
///   accident
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiCode(String);

impl ApiCode {
    /// Wrap a presented API code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the raw code for comparison against issued credentials.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApiCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ApiCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

// Hide code value in Debug output
impl fmt::Debug for ApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiCode").field(&"[REDACTED]").finish()
    }
}
