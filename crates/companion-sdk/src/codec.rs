//! JSON envelope codec
//!
//! All request and response bodies pass through here. Decoding is a single
//! path: bytes are parsed once into a JSON value, then matched against the
//! typed schema for the endpoint. Well-formed JSON that does not fit the schema
//! comes back as [`Decoded::Unknown`] instead of an error, so callers can tell
//! contract drift apart from garbage.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of decoding a response body against a typed schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Body matched the schema.
    Known(T),
    /// Body was valid JSON of some other shape.
    Unknown {
        /// The parsed body.
        value: Value,
        /// Why it did not match.
        reason: String,
    },
}

/// A service-reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Machine-readable error code, when present.
    pub code: Option<String>,
    /// Error message, or the raw body text when no structure was found.
    pub message: String,
}

/// Encode a request payload.
pub fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(payload)
}

/// Decode a body into a generic JSON value.
pub fn decode_value(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Decode a body into `T`, falling back to [`Decoded::Unknown`].
///
/// Fails only when the bytes are not well-formed JSON.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Decoded<T>, serde_json::Error> {
    let value = decode_value(bytes)?;
    match T::deserialize(&value) {
        Ok(typed) => Ok(Decoded::Known(typed)),
        Err(e) => Ok(Decoded::Unknown {
            value,
            reason: e.to_string(),
        }),
    }
}

/// Extract the service error from a non-success response body.
///
/// Falls back to the raw body text when no structured error parses.
pub fn remote_error(body: &[u8]) -> RemoteError {
    decode_value(body)
        .ok()
        .and_then(|value| structured_error(&value))
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            RemoteError {
                code: None,
                message: if text.is_empty() {
                    "empty response body".to_string()
                } else {
                    text
                },
            }
        })
}

/// Error carried inside a 2xx body that otherwise failed to match its schema.
///
/// Only bodies with an explicit `error` member qualify.
pub fn embedded_error(value: &Value) -> Option<RemoteError> {
    value.get("error")?;
    structured_error(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested {
        error: ErrorDetail,
    },
    Flat {
        #[serde(alias = "type")]
        code: Option<String>,
        message: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Object {
        #[serde(alias = "type")]
        code: Option<String>,
        message: Option<String>,
    },
}

fn structured_error(value: &Value) -> Option<RemoteError> {
    let body = ErrorBody::deserialize(value).ok()?;
    let error = match body {
        ErrorBody::Nested {
            error: ErrorDetail::Text(message),
        } => RemoteError {
            code: None,
            message,
        },
        ErrorBody::Nested {
            error: ErrorDetail::Object { code, message },
        } => {
            let message = message.or_else(|| code.clone())?;
            RemoteError { code, message }
        }
        ErrorBody::Flat { code, message } => RemoteError { code, message },
    };
    Some(error)
}
