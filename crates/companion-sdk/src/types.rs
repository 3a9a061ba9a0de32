//! Wire types for the Kindroid and Nomi APIs
//!
//! Field names follow each service's JSON: Kindroid uses snake_case, Nomi uses
//! camelCase and calls ids `uuid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared envelopes
// =============================================================================

/// Message text inside a sent/reply container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Message text.
    pub text: String,
}

impl MessageEnvelope {
    /// Create an envelope.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// `{"sentMessage": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageContainer {
    /// The message as the service recorded it.
    pub sent_message: MessageEnvelope,
}

/// `{"replyMessage": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMessageContainer {
    /// The participant's reply.
    pub reply_message: MessageEnvelope,
}

// =============================================================================
// Nomi
// =============================================================================

/// A participant known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant id.
    #[serde(rename = "uuid")]
    pub id: String,

    /// Display name.
    #[serde(rename = "name", default)]
    pub display_name: String,
}

impl Participant {
    /// Participant with no display name.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
        }
    }
}

/// A Nomi room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Server-assigned id; stable once created.
    #[serde(rename = "uuid")]
    pub id: String,

    /// Room name, unique per account by convention only.
    pub name: String,

    /// Members in the order the service lists them.
    #[serde(rename = "nomis", default)]
    pub members: Vec<Participant>,

    /// Room description.
    #[serde(default)]
    pub note: String,

    /// Whether participants may interject without being asked.
    #[serde(default)]
    pub backchanneling_enabled: bool,
}

impl Room {
    /// Empty room.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            note: String::new(),
            backchanneling_enabled: false,
        }
    }

    /// Replace the member list with bare participant ids.
    pub fn with_member_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = ids.into_iter().map(Participant::with_id).collect();
        self
    }

    /// Member ids in listing order.
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.id.as_str()).collect()
    }

    /// Whether the participant is a member.
    pub fn has_member(&self, participant_id: &str) -> bool {
        self.members.iter().any(|m| m.id == participant_id)
    }
}

/// `GET /rooms` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomList {
    /// Every room visible to the account.
    pub rooms: Vec<Room>,
}

/// Body for creating or updating a room.
///
/// Updates replace the whole member list, so `participant_ids` must always
/// carry every member that should remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    /// Room name.
    pub name: String,

    /// Room description.
    pub note: String,

    /// Backchanneling flag.
    pub backchanneling_enabled: bool,

    /// Full member list.
    #[serde(rename = "nomiUuids")]
    pub participant_ids: Vec<String>,
}

impl RoomRequest {
    /// Request with no members and backchanneling off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: String::new(),
            backchanneling_enabled: false,
            participant_ids: Vec::new(),
        }
    }

    /// Set the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Set the backchanneling flag.
    pub fn with_backchanneling(mut self, enabled: bool) -> Self {
        self.backchanneling_enabled = enabled;
        self
    }

    /// Set the member list.
    pub fn with_participants<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participant_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Nomi chat body, for both direct and room messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    /// Message text.
    pub message_text: String,
}

/// Body asking a room member to reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomReplyRequest {
    /// Participant asked to reply.
    #[serde(rename = "nomiUuid")]
    pub participant_id: String,
}

// =============================================================================
// Kindroid
// =============================================================================

/// `POST /send-message` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinMessageRequest {
    /// Target AI id.
    pub ai_id: String,
    /// Message text.
    pub message: String,
}

/// `POST /chat-break` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBreakRequest {
    /// Target AI id.
    pub ai_id: String,
    /// Greeting the AI opens the new conversation with.
    pub greeting: String,
}

/// One line of a Discord conversation forwarded to Kindroid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Discord display name of the author.
    pub username: String,
    /// Message text.
    pub text: String,
    /// When the message was posted.
    pub timestamp: DateTime<Utc>,
}

/// `POST /discord-bot` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordBotRequest {
    /// Share code of the Kindroid bot.
    pub share_code: String,
    /// Whether the NSFW filter is on.
    pub enable_filter: bool,
    /// Recent conversation, oldest first.
    pub conversation: Vec<ConversationEntry>,
}
