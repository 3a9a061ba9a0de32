//! Request plumbing shared by the service clients.
//!
//! Builds headers, encodes the body, runs the transport, and maps the outcome
//! onto [`CompanionError`] with the calling operation attached.

use crate::codec::{self, Decoded};
use crate::config::{Credentials, ServiceEndpoint, ServiceKind};
use crate::error::{CompanionError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticated access to one service.
#[derive(Clone)]
pub(crate) struct ApiClient {
    /// Which service this is.
    kind: ServiceKind,

    /// Service endpoint configuration.
    endpoint: ServiceEndpoint,

    /// Resolved credentials.
    credentials: Credentials,

    /// HTTP transport.
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Resolve credentials from the endpoint and bind a transport.
    pub(crate) fn new(
        kind: ServiceKind,
        endpoint: ServiceEndpoint,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let credentials = endpoint.credentials(kind)?;
        Ok(Self {
            kind,
            endpoint,
            credentials,
            transport,
        })
    }

    pub(crate) fn participant_id(&self) -> &str {
        &self.credentials.participant_id
    }

    pub(crate) fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// `GET` and decode a JSON response.
    pub(crate) async fn get_json<T>(&self, operation: &str, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(operation, Method::GET, path, None, &[]).await?;
        self.decode_json(operation, response)
    }

    /// Send a JSON body and decode a JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.encode(operation, body)?;
        let response = self.execute(operation, method, path, Some(body), &[]).await?;
        self.decode_json(operation, response)
    }

    /// `POST` a JSON body and return the plain-text response.
    pub(crate) async fn post_for_text<B>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
        extra_headers: &[(&str, &str)],
    ) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let body = self.encode(operation, body)?;
        let response = self
            .execute(operation, Method::POST, path, Some(body), extra_headers)
            .await?;
        Ok(response.text())
    }

    fn encode<B: Serialize + ?Sized>(&self, operation: &str, body: &B) -> Result<Vec<u8>> {
        codec::encode(body).map_err(|source| CompanionError::Encoding {
            operation: operation.to_string(),
            source,
        })
    }

    /// Issue the request; non-2xx statuses become [`CompanionError::RemoteRejected`].
    async fn execute(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let url = self.endpoint.url(path);
        debug!(service = %self.kind, %method, %url, "Calling {}", operation);

        let mut headers = vec![
            (
                "Authorization".to_string(),
                self.kind.auth_scheme().header_value(&self.credentials.api_key),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(
            extra_headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );

        let response = self
            .transport
            .execute(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await
            .map_err(|source| CompanionError::Transport {
                operation: operation.to_string(),
                source,
            })?;

        if !response.is_success() {
            let remote = codec::remote_error(&response.body);
            warn!(
                service = %self.kind,
                status = response.status,
                code = ?remote.code,
                "{} API error: {}",
                self.kind,
                remote.message
            );
            return Err(CompanionError::RemoteRejected {
                operation: operation.to_string(),
                status: response.status,
                code: remote.code,
                message: remote.message,
            });
        }

        Ok(response)
    }

    fn decode_json<T: DeserializeOwned>(&self, operation: &str, response: HttpResponse) -> Result<T> {
        let decoded = codec::decode::<T>(&response.body).map_err(|source| {
            CompanionError::Decoding {
                operation: operation.to_string(),
                source,
            }
        })?;

        match decoded {
            Decoded::Known(value) => Ok(value),
            Decoded::Unknown { value, reason } => {
                if let Some(remote) = codec::embedded_error(&value) {
                    warn!(service = %self.kind, "{} API error in success body: {}", self.kind, remote.message);
                    return Err(CompanionError::RemoteRejected {
                        operation: operation.to_string(),
                        status: response.status,
                        code: remote.code,
                        message: remote.message,
                    });
                }
                Err(CompanionError::UnexpectedShape {
                    operation: operation.to_string(),
                    detail: reason,
                })
            }
        }
    }
}
