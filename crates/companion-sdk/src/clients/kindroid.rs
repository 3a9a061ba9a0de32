//! Kindroid service client.
//!
//! HTTP client for the Kindroid API. Provides direct messaging, chat breaks,
//! and forwarding Discord conversations to a shared Kindroid bot. Replies come
//! back as plain text, not JSON envelopes.

use super::api::ApiClient;
use super::{length_notice, MessagingService};
use crate::config::{ServiceEndpoint, ServiceKind};
use crate::error::{CompanionError, Result};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ChatBreakRequest, ConversationEntry, DiscordBotRequest, KinMessageRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Header identifying the Discord user a bot request is made for.
pub const REQUESTER_HEADER: &str = "X-Kindroid-Requester";

/// Reply used when a chat break succeeds with an empty body.
pub const CHAT_BREAK_OK: &str = "Chat break successful";

/// Kindroid service client.
#[derive(Clone)]
pub struct KindroidClient {
    api: ApiClient,
}

impl std::fmt::Debug for KindroidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindroidClient")
            .field("base_url", &self.api.endpoint().base_url)
            .field("ai_id", &self.api.participant_id())
            .finish()
    }
}

impl KindroidClient {
    /// Create a new Kindroid client.
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout).map_err(|source| CompanionError::Transport {
            operation: "build_http_client".to_string(),
            source,
        })?;
        Self::with_transport(endpoint, Arc::new(transport))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(endpoint: ServiceEndpoint, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(ServiceKind::Kindroid, endpoint, transport)?,
        })
    }

    /// Start a fresh conversation with the configured AI.
    ///
    /// The AI opens the new conversation with `greeting`.
    #[instrument(skip(self, greeting), fields(ai_id = %self.api.participant_id()))]
    pub async fn chat_break(&self, greeting: &str) -> Result<String> {
        debug!("Sending chat break ({} chars)", greeting.chars().count());

        let body = ChatBreakRequest {
            ai_id: self.api.participant_id().to_string(),
            greeting: greeting.to_string(),
        };
        let operation = format!("chat_break(ai_id={})", body.ai_id);
        let reply = self.api.post_for_text(&operation, "/chat-break", &body, &[]).await?;

        if reply.trim().is_empty() {
            Ok(CHAT_BREAK_OK.to_string())
        } else {
            Ok(reply)
        }
    }

    /// Forward a Discord conversation to a shared Kindroid bot.
    ///
    /// `requester` identifies the Discord user and must not be empty; an empty
    /// requester is rejected before anything is sent.
    #[instrument(skip(self, conversation), fields(messages = conversation.len()))]
    pub async fn discord_bot(
        &self,
        share_code: &str,
        enable_filter: bool,
        requester: &str,
        conversation: Vec<ConversationEntry>,
    ) -> Result<String> {
        if requester.trim().is_empty() {
            return Err(CompanionError::InvalidRequest(format!(
                "{} header is required for the discord-bot endpoint",
                REQUESTER_HEADER
            )));
        }

        debug!("Forwarding {} Discord messages", conversation.len());

        let body = DiscordBotRequest {
            share_code: share_code.to_string(),
            enable_filter,
            conversation,
        };
        let operation = format!("discord_bot(share_code={})", share_code);
        self.api
            .post_for_text(&operation, "/discord-bot", &body, &[(REQUESTER_HEADER, requester)])
            .await
    }
}

#[async_trait]
impl MessagingService for KindroidClient {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Kindroid
    }

    fn participant_id(&self) -> &str {
        self.api.participant_id()
    }

    #[instrument(skip(self, participant_id, text), fields(ai_id = %participant_id))]
    async fn send_message_to(&self, participant_id: &str, text: &str) -> Result<String> {
        if let Some(notice) = length_notice(text, ServiceKind::Kindroid.max_message_chars()) {
            info!("Message too long: {} characters", text.chars().count());
            return Ok(notice);
        }

        debug!("Sending message to Kin {} ({} chars)", participant_id, text.chars().count());

        let body = KinMessageRequest {
            ai_id: participant_id.to_string(),
            message: text.to_string(),
        };
        let operation = format!("send_message(ai_id={})", participant_id);
        let reply = self.api.post_for_text(&operation, "/send-message", &body, &[]).await?;

        if reply.trim().is_empty() {
            return Err(CompanionError::UnexpectedShape {
                operation,
                detail: "empty reply body".to_string(),
            });
        }

        debug!("Received reply from Kin {}", participant_id);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn client(transport: Arc<MockTransport>) -> KindroidClient {
        let endpoint = ServiceEndpoint::new("http://kin.test/v1").with_credentials("kin-key", "ai-1");
        KindroidClient::with_transport(endpoint, transport).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_returns_plain_text_reply() {
        let transport = Arc::new(MockTransport::new().respond(200, "Hey there!"));
        let kin = client(transport.clone());

        let reply = kin.send_message("hello").await.unwrap();

        assert_eq!(reply, "Hey there!");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://kin.test/v1/send-message");
        assert_eq!(requests[0].header("Authorization"), Some("Bearer kin-key"));
        assert_eq!(transport.request_body(0), json!({"ai_id": "ai-1", "message": "hello"}));
    }

    #[tokio::test]
    async fn test_send_message_length_boundary() {
        let transport = Arc::new(MockTransport::new().respond(200, "ok"));
        let kin = client(transport.clone());

        assert_eq!(kin.send_message(&"a".repeat(750)).await.unwrap(), "ok");

        let notice = kin.send_message(&"a".repeat(751)).await.unwrap();
        assert!(notice.contains("`751`"));
        assert!(notice.contains("750"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_is_unexpected_shape() {
        let transport = Arc::new(MockTransport::new().respond(200, ""));
        let err = client(transport).send_message("hello").await.unwrap_err();
        assert!(matches!(err, CompanionError::UnexpectedShape { .. }));
    }

    #[tokio::test]
    async fn test_rejection_surfaces_raw_body() {
        let transport = Arc::new(MockTransport::new().respond(403, "Invalid AI id"));
        match client(transport).send_message_to("ai-2", "hello").await.unwrap_err() {
            CompanionError::RemoteRejected {
                operation,
                status,
                message,
                ..
            } => {
                assert_eq!(operation, "send_message(ai_id=ai-2)");
                assert_eq!(status, 403);
                assert_eq!(message, "Invalid AI id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_break_empty_body_defaults() {
        let transport = Arc::new(MockTransport::new().respond(200, "").respond(200, "Fresh start!"));
        let kin = client(transport.clone());

        assert_eq!(kin.chat_break("Hi again").await.unwrap(), CHAT_BREAK_OK);
        assert_eq!(kin.chat_break("Hi again").await.unwrap(), "Fresh start!");
        assert_eq!(
            transport.request_body(0),
            json!({"ai_id": "ai-1", "greeting": "Hi again"})
        );
    }

    #[tokio::test]
    async fn test_discord_bot_requires_requester() {
        let transport = Arc::new(MockTransport::new());
        let kin = client(transport.clone());

        let err = kin.discord_bot("share", true, " ", Vec::new()).await.unwrap_err();
        assert!(matches!(err, CompanionError::InvalidRequest(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_discord_bot_sends_requester_header() {
        let transport = Arc::new(MockTransport::new().respond(200, "Hello Discord"));
        let kin = client(transport.clone());
        let conversation = vec![ConversationEntry {
            username: "alice".to_string(),
            text: "hi bot".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }];

        let reply = kin
            .discord_bot("share-code", false, "alice#1234", conversation)
            .await
            .unwrap();

        assert_eq!(reply, "Hello Discord");
        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://kin.test/v1/discord-bot");
        assert_eq!(request.header(REQUESTER_HEADER), Some("alice#1234"));
        assert_eq!(
            transport.request_body(0),
            json!({
                "share_code": "share-code",
                "enable_filter": false,
                "conversation": [
                    {"username": "alice", "text": "hi bot", "timestamp": "2024-05-01T12:00:00Z"}
                ]
            })
        );
    }
}
