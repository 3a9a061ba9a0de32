//! Nomi service client.
//!
//! HTTP client for the Nomi API. Provides direct messaging, room listing and
//! management, room messaging, and [`NomiClient::ensure_room`], which runs
//! room reconciliation for the configured Nomi.

use super::api::ApiClient;
use super::{length_notice, MessagingService};
use crate::config::{ServiceEndpoint, ServiceKind};
use crate::error::{CompanionError, Result};
use crate::rooms::{find_by_name, Reconciliation, RoomDirectory, RoomReconciler};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    ChatMessageRequest, ReplyMessageContainer, Room, RoomList, RoomReplyRequest, RoomRequest,
    SentMessageContainer,
};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Nomi service client.
#[derive(Clone)]
pub struct NomiClient {
    api: ApiClient,
}

impl std::fmt::Debug for NomiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NomiClient")
            .field("base_url", &self.api.endpoint().base_url)
            .field("nomi_id", &self.api.participant_id())
            .finish()
    }
}

impl NomiClient {
    /// Create a new Nomi client.
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
            api: ApiClient::new(ServiceKind::Nomi, endpoint, transport)?,
        })
    }

    /// Find the first room named exactly `name`.
    #[instrument(skip(self))]
    pub async fn find_room(&self, name: &str) -> Result<Option<Room>> {
        debug!("Checking Nomi {} room {}", self.api.participant_id(), name);
        let rooms = self.list_rooms().await?;
        Ok(find_by_name(&rooms, name).cloned())
    }

    /// Ensure a room named `desired.name` exists with the configured Nomi in it.
    ///
    /// See [`RoomReconciler::reconcile`].
    pub async fn ensure_room(&self, desired: &RoomRequest) -> Result<Reconciliation> {
        RoomReconciler::new(self)
            .reconcile(desired, self.api.participant_id())
            .await
    }

    /// Post a message into a room.
    ///
    /// Returns a confirmation line quoting the text the service recorded.
    /// Messages over the length limit are not sent; a notice is returned
    /// instead.
    #[instrument(skip(self, text))]
    pub async fn send_room_message(&self, room_id: &str, text: &str) -> Result<String> {
        if let Some(notice) = length_notice(text, ServiceKind::Nomi.max_message_chars()) {
            info!("Message too long: {} characters", text.chars().count());
            return Ok(notice);
        }

        let body = ChatMessageRequest {
            message_text: text.to_string(),
        };
        let operation = format!("send_room_message(room={})", room_id);
        let sent: SentMessageContainer = self
            .api
            .send_json(&operation, Method::POST, &format!("/rooms/{}/chat", room_id), &body)
            .await?;

        debug!("Sent message to room {}", room_id);
        Ok(format!(
            "Sent message to room {}: {}",
            room_id, sent.sent_message.text
        ))
    }

    /// Ask a room member to reply to the conversation so far.
    #[instrument(skip(self))]
    pub async fn request_room_reply(&self, room_id: &str, participant_id: &str) -> Result<String> {
        let body = RoomReplyRequest {
            participant_id: participant_id.to_string(),
        };
        let operation = format!("request_room_reply(room={}, nomi={})", room_id, participant_id);
        let reply: ReplyMessageContainer = self
            .api
            .send_json(
                &operation,
                Method::POST,
                &format!("/rooms/{}/chat/request", room_id),
                &body,
            )
            .await?;

        debug!("Received reply from Nomi {} in room {}", participant_id, room_id);
        Ok(reply.reply_message.text)
    }
}

#[async_trait]
impl RoomDirectory for NomiClient {
    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let listing: RoomList = self.api.get_json("list_rooms", "/rooms").await?;
        debug!("Listed {} rooms", listing.rooms.len());
        Ok(listing.rooms)
    }

    #[instrument(skip(self, request), fields(room = %request.name))]
    async fn create_room(&self, request: &RoomRequest) -> Result<Room> {
        let operation = format!("create_room(name={})", request.name);
        self.api
            .send_json(&operation, Method::POST, "/rooms", request)
            .await
    }

    #[instrument(skip(self, request), fields(room = %request.name))]
    async fn update_room(&self, room_id: &str, request: &RoomRequest) -> Result<Room> {
        let operation = format!("update_room(room={})", room_id);
        self.api
            .send_json(&operation, Method::PUT, &format!("/rooms/{}", room_id), request)
            .await
    }
}

#[async_trait]
impl MessagingService for NomiClient {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Nomi
    }

    fn participant_id(&self) -> &str {
        self.api.participant_id()
    }

    #[instrument(skip(self, participant_id, text), fields(nomi = %participant_id))]
    async fn send_message_to(&self, participant_id: &str, text: &str) -> Result<String> {
        if let Some(notice) = length_notice(text, ServiceKind::Nomi.max_message_chars()) {
            info!("Message too long: {} characters", text.chars().count());
            return Ok(notice);
        }

        debug!("Sending message to Nomi {} ({} chars)", participant_id, text.chars().count());

        let body = ChatMessageRequest {
            message_text: text.to_string(),
        };
        let operation = format!("send_message(nomi={})", participant_id);
        let reply: ReplyMessageContainer = self
            .api
            .send_json(
                &operation,
                Method::POST,
                &format!("/nomis/{}/chat", participant_id),
                &body,
            )
            .await?;

        debug!("Received reply from Nomi {}", participant_id);
        Ok(reply.reply_message.text)
    }
}
