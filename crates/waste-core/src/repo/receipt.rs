//! Validated receipt payloads.
//!
//! [`Receipt`] guarantees the payload is a JSON object holding a `movement`
//! object whose `apiCode` is a string. Everything else in the payload is
//! opaque to this crate.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::ApiCode;

/// A validated receipt payload.
///
/// # Example
///
/// ```
/// use waste_core::Receipt;
/// use serde_json::json;
///
/// let receipt = Receipt::new(json!({
///     "movement": { "receivingSiteId": "site-1", "apiCode": "asd" }
/// })).unwrap();
///
/// assert_eq!(receipt.api_code().as_str(), "asd");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt(Value);

impl Receipt {
    /// Create a receipt from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object, has no `movement`
    /// object, or `movement.apiCode` is missing or not a string.
    pub fn new(value: Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| invalid("receipt must be a JSON object"))?;
        let movement = obj
            .get("movement")
            .ok_or_else(|| invalid("receipt must contain a movement"))?;
        Self::movement_api_code(movement)?;
        Ok(Self(value))
    }

    /// Wrap a bare movement object as `{ "movement": movement }`.
    pub fn from_movement(movement: Value) -> Result<Self, Error> {
        let mut obj = Map::new();
        obj.insert("movement".to_string(), movement);
        Self::new(Value::Object(obj))
    }

    /// Extract the API code from a movement object.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement is not an object or its `apiCode`
    /// is missing or not a string.
    pub fn movement_api_code(movement: &Value) -> Result<ApiCode, Error> {
        let movement = movement
            .as_object()
            .ok_or_else(|| invalid("movement must be a JSON object"))?;
        let code = movement
            .get("apiCode")
            .ok_or_else(|| invalid("movement must contain an apiCode"))?
            .as_str()
            .ok_or_else(|| invalid("movement.apiCode must be a string"))?;
        Ok(ApiCode::new(code))
    }

    /// The API code the receipt was submitted with.
    pub fn api_code(&self) -> ApiCode {
        // Validated at construction
        ApiCode::new(self.0["movement"]["apiCode"].as_str().unwrap_or_default())
    }

    /// The `movement` section of the receipt.
    pub fn movement(&self) -> &Value {
        &self.0["movement"]
    }

    /// Get a reference to the inner JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Return a copy of this receipt with `partial` merged in at `path`.
    ///
    /// When both the existing value at `path` and `partial` are objects,
    /// the keys of `partial` overwrite the existing keys and all other keys
    /// are kept. Otherwise the value at `path` is replaced. Missing
    /// intermediate objects are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged result is no longer a valid receipt.
    pub fn merged(&self, path: &ReceiptPath, partial: &Value) -> Result<Self, Error> {
        let mut value = self.0.clone();
        let segments: Vec<&str> = path.segments().collect();
        merge_at(&mut value, &segments, partial);
        Self::new(value)
    }
}

fn merge_at(target: &mut Value, segments: &[&str], partial: &Value) {
    match segments.split_first() {
        None => match (target, partial) {
            (Value::Object(existing), Value::Object(incoming)) => {
                for (key, value) in incoming {
                    existing.insert(key.clone(), value.clone());
                }
            }
            (target, _) => *target = partial.clone(),
        },
        Some((head, rest)) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let child = map.entry(head.to_string()).or_insert(Value::Null);
                merge_at(child, rest, partial);
            }
        }
    }
}

fn invalid(reason: &str) -> Error {
    InvalidInputError::Receipt {
        reason: reason.to_string(),
    }
    .into()
}

impl Serialize for Receipt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Receipt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Receipt::new(value).map_err(serde::de::Error::custom)
    }
}

/// A dotted path into a receipt, such as `movement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptPath(String);

impl ReceiptPath {
    /// Create a path, validating that every segment is non-empty.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() || s.split('.').any(str::is_empty) {
            return Err(InvalidInputError::ReceiptPath {
                value: s,
                reason: "segments must be non-empty".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// The path of the movement section.
    pub fn movement() -> Self {
        Self("movement".to_string())
    }

    /// Iterate the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
