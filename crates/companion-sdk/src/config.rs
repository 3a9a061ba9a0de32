//! Service configuration for companion clients.
//!
//! Each client is built from an immutable [`ServiceEndpoint`]; nothing here is
//! process-wide. Configuration can be assembled in code or loaded from
//! environment variables with the public service URLs as defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was not configured.
    #[error("Missing required configuration value: {0}")]
    MissingValue(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// The companion services this SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Single-endpoint, stateless messaging.
    Kindroid,
    /// Room-based, multi-party messaging.
    Nomi,
}

impl ServiceKind {
    /// Human-readable service name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Kindroid => "Kindroid",
            Self::Nomi => "Nomi",
        }
    }

    /// Longest message, in characters, the service accepts.
    pub fn max_message_chars(self) -> usize {
        match self {
            Self::Kindroid => 750,
            Self::Nomi => 600,
        }
    }

    /// How the API key is presented in the `Authorization` header.
    pub fn auth_scheme(self) -> AuthScheme {
        match self {
            Self::Kindroid => AuthScheme::Bearer,
            Self::Nomi => AuthScheme::Raw,
        }
    }

    /// Public API base URL.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Kindroid => "https://api.kindroid.ai/v1",
            Self::Nomi => "https://api.nomi.ai/v1",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `Authorization` header format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: <key>`
    Raw,
}

impl AuthScheme {
    /// Header value for the given key.
    pub fn header_value(self, api_key: &str) -> String {
        match self {
            Self::Bearer => format!("Bearer {}", api_key),
            Self::Raw => api_key.to_string(),
        }
    }
}

/// API key and participant a client acts for.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Service API key.
    pub api_key: String,

    /// Participant (AI id / Nomi uuid) messages are addressed to.
    pub participant_id: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(api_key: impl Into<String>, participant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            participant_id: participant_id.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("participant_id", &self.participant_id)
            .finish()
    }
}

/// Service configuration for both companion services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Kindroid API configuration.
    pub kindroid: ServiceEndpoint,

    /// Nomi API configuration.
    pub nomi: ServiceEndpoint,

    /// Request timeout in seconds, applied by the HTTP transport.
    pub default_timeout_secs: u64,
}

impl Default for ServiceConfig {
    /// Public service URLs, no credentials.
    fn default() -> Self {
        Self {
            kindroid: ServiceEndpoint::new(ServiceKind::Kindroid.default_base_url()),
            nomi: ServiceEndpoint::new(ServiceKind::Nomi.default_base_url()),
            default_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KINDROID_API_URL`: Kindroid base URL (default: https://api.kindroid.ai/v1)
    /// - `KINDROID_API_KEY`: Kindroid API key
    /// - `KINDROID_AI_ID`: Kindroid AI id messages are sent to
    /// - `NOMI_API_URL`: Nomi base URL (default: https://api.nomi.ai/v1)
    /// - `NOMI_API_KEY`: Nomi API key
    /// - `NOMI_ID`: Nomi uuid messages are sent to and rooms are joined for
    /// - `COMPANION_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let default_timeout_secs = match std::env::var("COMPANION_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "COMPANION_TIMEOUT_SECS".to_string(),
                message: format!("expected a whole number of seconds, got {:?}", raw),
            })?,
            Err(_) => default.default_timeout_secs,
        };

        Ok(Self {
            kindroid: ServiceEndpoint {
                base_url: std::env::var("KINDROID_API_URL").unwrap_or(default.kindroid.base_url),
                api_key: std::env::var("KINDROID_API_KEY").ok(),
                participant_id: std::env::var("KINDROID_AI_ID").ok(),
            },
            nomi: ServiceEndpoint {
                base_url: std::env::var("NOMI_API_URL").unwrap_or(default.nomi.base_url),
                api_key: std::env::var("NOMI_API_KEY").ok(),
                participant_id: std::env::var("NOMI_ID").ok(),
            },
            default_timeout_secs,
        })
    }

    /// Get the default request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Endpoint configuration for a service.
    pub fn endpoint(&self, kind: ServiceKind) -> &ServiceEndpoint {
        match kind {
            ServiceKind::Kindroid => &self.kindroid,
            ServiceKind::Nomi => &self.nomi,
        }
    }
}

/// Configuration for a single service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL for the service (e.g., "https://api.nomi.ai/v1").
    pub base_url: String,

    /// API key. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Participant the client acts for.
    #[serde(default)]
    pub participant_id: Option<String>,
}

impl ServiceEndpoint {
    /// Endpoint with no credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            participant_id: None,
        }
    }

    /// Set the API key and participant.
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        participant_id: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.participant_id = Some(participant_id.into());
        self
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check if API key authentication is available.
    pub fn has_auth(&self) -> bool {
        self.api_key.is_some()
    }

    /// Credentials for this endpoint; both the key and participant are required.
    pub fn credentials(&self, kind: ServiceKind) -> Result<Credentials, ConfigError> {
        let api_key = non_empty(self.api_key.as_deref())
            .ok_or_else(|| ConfigError::MissingValue(format!("{} API key", kind)))?;
        let participant_id = non_empty(self.participant_id.as_deref())
            .ok_or_else(|| ConfigError::MissingValue(format!("{} participant id", kind)))?;
        Ok(Credentials::new(api_key, participant_id))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
