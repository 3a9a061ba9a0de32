//! Error types for companion service operations
//!
//! Every remote-facing variant carries the operation it came from, e.g.
//! `update_room(room=r1)`, so callers can tell which step of a multi-call
//! operation failed.

use crate::config::ConfigError;
use crate::transport::TransportError;
use thiserror::Error;

/// Companion SDK error types.
#[derive(Debug, Error)]
pub enum CompanionError {
    /// The request never produced an HTTP response.
    #[error("{operation}: transport failure: {source}")]
    Transport {
        /// Operation context.
        operation: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// Request payload could not be serialized.
    #[error("{operation}: failed to encode request: {source}")]
    Encoding {
        /// Operation context.
        operation: String,
        /// Serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// Response body was not well-formed JSON.
    #[error("{operation}: failed to decode response: {source}")]
    Decoding {
        /// Operation context.
        operation: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The service answered with an error.
    #[error("{operation}: remote rejected request ({status}): {message}")]
    RemoteRejected {
        /// Operation context.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Service error code, when the body carried one.
        code: Option<String>,
        /// Service error message, or the raw body text.
        message: String,
    },

    /// Success status, but the body is missing an expected field.
    #[error("{operation}: unexpected response shape: {detail}")]
    UnexpectedShape {
        /// Operation context.
        operation: String,
        /// What was wrong with the body.
        detail: String,
    },

    /// Request rejected locally before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CompanionError {
    /// Whether the service reported that the resource already exists.
    ///
    /// Matches HTTP 409 and any error code or message that spells
    /// "already exists" (`RoomAlreadyExists`, `room_already_exists`, ...).
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::RemoteRejected {
                status,
                code,
                message,
                ..
            } => {
                *status == 409
                    || code.as_deref().is_some_and(mentions_already_exists)
                    || mentions_already_exists(message)
            }
            _ => false,
        }
    }

    /// Operation context, if the error came from a remote call.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Transport { operation, .. }
            | Self::Encoding { operation, .. }
            | Self::Decoding { operation, .. }
            | Self::RemoteRejected { operation, .. }
            | Self::UnexpectedShape { operation, .. } => Some(operation),
            Self::InvalidRequest(_) | Self::Config(_) => None,
        }
    }
}

fn mentions_already_exists(text: &str) -> bool {
    let normalized: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    normalized.contains("alreadyexists")
}

/// Result type for companion SDK operations.
pub type Result<T> = std::result::Result<T, CompanionError>;
