//! Service client modules.
//!
//! - Kindroid: single-endpoint messaging, chat breaks, Discord conversations
//! - Nomi: direct messaging, rooms, room reconciliation
//!
//! Both clients share one request path (`api`) and expose direct messaging
//! through the [`MessagingService`] trait.

mod api;
pub mod kindroid;
pub mod nomi;

pub use kindroid::KindroidClient;
pub use nomi::NomiClient;

use crate::config::{ServiceConfig, ServiceKind};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Send a message to a participant and get its reply.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Which service this client talks to.
    fn kind(&self) -> ServiceKind;

    /// Participant configured for this client.
    fn participant_id(&self) -> &str;

    /// Send `text` to `participant_id` and return the reply text.
    ///
    /// Messages over the service limit are not sent; the result is
    /// `Ok` with a notice for the user instead.
    async fn send_message_to(&self, participant_id: &str, text: &str) -> Result<String>;

    /// Send `text` to the configured participant.
    async fn send_message(&self, text: &str) -> Result<String> {
        self.send_message_to(self.participant_id(), text).await
    }
}

/// Build the messaging client for `kind` from configuration.
pub fn messaging_service(
    config: &ServiceConfig,
    kind: ServiceKind,
) -> Result<Arc<dyn MessagingService>> {
    let endpoint = config.endpoint(kind).clone();
    let service: Arc<dyn MessagingService> = match kind {
        ServiceKind::Kindroid => Arc::new(KindroidClient::new(endpoint, config.timeout())?),
        ServiceKind::Nomi => Arc::new(NomiClient::new(endpoint, config.timeout())?),
    };
    Ok(service)
}

/// Notice returned instead of sending a message over `limit` characters.
///
/// Length is counted in characters, not bytes. Returns `None` when the
/// message fits.
pub fn length_notice(text: &str, limit: usize) -> Option<String> {
    let length = text.chars().count();
    (length > limit).then(|| {
        format!(
            "Your message was `{}` characters long, but the maximum message length is {}. Please send a shorter message.",
            length, limit
        )
    })
}
