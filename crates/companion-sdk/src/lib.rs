//! # Companion SDK
//!
//! Client SDK for relaying chat traffic to hosted AI companion services.
//!
//! ## Overview
//!
//! The companion-sdk crate handles:
//! - **Messaging**: Send a message to a companion and get its reply (Kindroid and Nomi)
//! - **Rooms**: Find, create, and join Nomi rooms idempotently
//! - **Room Messaging**: Post into a room and ask a member to reply
//! - **Kindroid extras**: Chat breaks and Discord conversation forwarding
//!
//! ## Services
//!
//! | Service  | Auth header         | Message limit |
//! |----------|---------------------|---------------|
//! | Kindroid | `Bearer <key>`      | 750 chars     |
//! | Nomi     | `<key>`             | 600 chars     |
//!
//! Messages over the limit are never sent. The call returns `Ok` with a notice
//! that reports the actual length and the limit, so a relay bot can post it
//! back to the user as-is.
//!
//! ## Room reconciliation
//!
//! [`NomiClient::ensure_room`] lists rooms, then creates the room, adds the
//! configured Nomi to it, or does nothing if the Nomi is already a member.
//! Nomi room updates replace the whole member list, so existing members are
//! always re-sent and a failed listing aborts before any write.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use companion_sdk::{MessagingService, NomiClient, RoomRequest, ServiceConfig};
//!
//! async fn relay() -> companion_sdk::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let nomi = NomiClient::new(config.nomi.clone(), config.timeout())?;
//!
//!     let reply = nomi.send_message("Hello!").await?;
//!     println!("{}", reply);
//!
//!     let room = nomi
//!         .ensure_room(&RoomRequest::new("Study Group").with_note("Discord relay"))
//!         .await?;
//!     nomi.send_room_message(room.room_id(), "Hi everyone").await?;
//!     let answer = nomi.request_room_reply(room.room_id(), nomi.participant_id()).await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod codec;
pub mod config;
pub mod error;
pub mod rooms;
pub mod transport;
pub mod types;

// Re-export main types
pub use clients::{length_notice, messaging_service, KindroidClient, MessagingService, NomiClient};
pub use config::{AuthScheme, ConfigError, Credentials, ServiceConfig, ServiceEndpoint, ServiceKind};
pub use error::{CompanionError, Result};
pub use rooms::{Reconciliation, RoomAction, RoomDirectory, RoomReconciler};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{
    ChatBreakRequest, ConversationEntry, DiscordBotRequest, MessageEnvelope, Participant, Room,
    RoomList, RoomRequest,
};
