//! End-to-end tests for direct and room messaging.
//!
//! Both services are simulated with wiremock. Length-limit tests use
//! `.expect(n)` to prove over-limit messages never reach the wire.

use chrono::{TimeZone, Utc};
use companion_sdk::clients::kindroid::REQUESTER_HEADER;
use companion_sdk::{
    messaging_service, CompanionError, ConversationEntry, KindroidClient, MessagingService,
    NomiClient, ServiceConfig, ServiceEndpoint, ServiceKind, TransportError,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock servers for both services.
struct TestFixture {
    /// Mock Kindroid server.
    kindroid_server: MockServer,
    /// Mock Nomi server.
    nomi_server: MockServer,
    /// Test service configuration.
    config: ServiceConfig,
}

impl TestFixture {
    async fn new() -> Self {
        let kindroid_server = MockServer::start().await;
        let nomi_server = MockServer::start().await;

        let config = ServiceConfig {
            kindroid: ServiceEndpoint::new(format!("{}/v1", kindroid_server.uri()))
                .with_credentials("test-kin-key", "ai-1"),
            nomi: ServiceEndpoint::new(format!("{}/v1", nomi_server.uri()))
                .with_credentials("test-nomi-key", "nomi-1"),
            default_timeout_secs: 5,
        };

        Self {
            kindroid_server,
            nomi_server,
            config,
        }
    }

    fn kindroid_client(&self) -> KindroidClient {
        KindroidClient::new(self.config.kindroid.clone(), self.config.timeout())
            .expect("client should build")
    }

    fn nomi_client(&self) -> NomiClient {
        NomiClient::new(self.config.nomi.clone(), self.config.timeout()).expect("client should build")
    }
}

// =============================================================================
// Kindroid
// =============================================================================

#[tokio::test]
async fn test_kindroid_send_message() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/send-message"))
        .and(header("Authorization", "Bearer test-kin-key"))
        .and(body_json(json!({"ai_id": "ai-1", "message": "How was your day?"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pretty good, thanks!"))
        .expect(1)
        .mount(&fixture.kindroid_server)
        .await;

    let reply = fixture
        .kindroid_client()
        .send_message("How was your day?")
        .await
        .expect("should get a reply");

    assert_eq!(reply, "Pretty good, thanks!");
}

#[tokio::test]
async fn test_kindroid_length_boundary() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/send-message"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&fixture.kindroid_server)
        .await;

    let kin = fixture.kindroid_client();
    assert_eq!(kin.send_message(&"k".repeat(750)).await.unwrap(), "ok");

    let notice = kin.send_message(&"k".repeat(751)).await.unwrap();
    assert_eq!(
        notice,
        "Your message was `751` characters long, but the maximum message length is 750. Please send a shorter message."
    );
}

#[tokio::test]
async fn test_kindroid_discord_bot() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/discord-bot"))
        .and(header(REQUESTER_HEADER, "bob"))
        .and(body_json(json!({
            "share_code": "abc123",
            "enable_filter": true,
            "conversation": [
                {"username": "bob", "text": "hey kin", "timestamp": "2024-03-02T08:15:00Z"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hi Bob!"))
        .expect(1)
        .mount(&fixture.kindroid_server)
        .await;

    let reply = fixture
        .kindroid_client()
        .discord_bot(
            "abc123",
            true,
            "bob",
            vec![ConversationEntry {
                username: "bob".to_string(),
                text: "hey kin".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap(),
            }],
        )
        .await
        .unwrap();

    assert_eq!(reply, "Hi Bob!");
}

// =============================================================================
// Nomi
// =============================================================================

#[tokio::test]
async fn test_nomi_send_message() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/nomis/nomi-1/chat"))
        .and(header("Authorization", "test-nomi-key"))
        .and(body_json(json!({"messageText": "Hi Nomi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sentMessage": {"uuid": "m1", "text": "Hi Nomi", "sent": "2024-01-01T00:00:00Z"},
            "replyMessage": {"uuid": "m2", "text": "Hi there!", "sent": "2024-01-01T00:00:01Z"}
        })))
        .expect(1)
        .mount(&fixture.nomi_server)
        .await;

    let reply = fixture.nomi_client().send_message("Hi Nomi").await.unwrap();
    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_nomi_length_boundary() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/nomis/nomi-1/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"replyMessage": {"text": "ok"}})),
        )
        .expect(1)
        .mount(&fixture.nomi_server)
        .await;

    let nomi = fixture.nomi_client();
    assert_eq!(nomi.send_message(&"n".repeat(600)).await.unwrap(), "ok");

    let notice = nomi.send_message(&"n".repeat(601)).await.unwrap();
    assert!(notice.contains("`601`"));
    assert!(notice.contains("600"));
}

#[tokio::test]
async fn test_nomi_rejection_carries_service_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/nomis/nomi-1/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "NoReply", "message": "The Nomi did not reply"}
        })))
        .expect(1)
        .mount(&fixture.nomi_server)
        .await;

    match fixture.nomi_client().send_message("Hi").await.unwrap_err() {
        CompanionError::RemoteRejected {
            operation,
            status,
            code,
            message,
        } => {
            assert_eq!(operation, "send_message(nomi=nomi-1)");
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("NoReply"));
            assert_eq!(message, "The Nomi did not reply");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_room_message_then_reply() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/rooms/r1/chat"))
        .and(body_json(json!({"messageText": "Welcome, everyone"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sentMessage": {"text": "Welcome, everyone"}
        })))
        .expect(1)
        .mount(&fixture.nomi_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/rooms/r1/chat/request"))
        .and(body_json(json!({"nomiUuid": "nomi-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "replyMessage": {"text": "Thanks for having me"}
        })))
        .expect(1)
        .mount(&fixture.nomi_server)
        .await;

    let nomi = fixture.nomi_client();
    let confirmation = nomi.send_room_message("r1", "Welcome, everyone").await.unwrap();
    let reply = nomi.request_room_reply("r1", "nomi-2").await.unwrap();

    assert_eq!(confirmation, "Sent message to room r1: Welcome, everyone");
    assert_eq!(reply, "Thanks for having me");
}

// =============================================================================
// Shared behaviour
// =============================================================================

#[tokio::test]
async fn test_services_through_trait_object() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/send-message"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from kin"))
        .mount(&fixture.kindroid_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/nomis/nomi-1/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"replyMessage": {"text": "from nomi"}})),
        )
        .mount(&fixture.nomi_server)
        .await;

    let mut replies = Vec::new();
    for kind in [ServiceKind::Kindroid, ServiceKind::Nomi] {
        let service = messaging_service(&fixture.config, kind).unwrap();
        replies.push(service.send_message("hello").await.unwrap());
    }

    assert_eq!(replies, vec!["from kin", "from nomi"]);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let endpoint = ServiceEndpoint::new("http://127.0.0.1:9/v1").with_credentials("key", "nomi-1");
    let nomi = NomiClient::new(endpoint, Duration::from_secs(2)).unwrap();

    match nomi.send_message("hello").await.unwrap_err() {
        CompanionError::Transport { operation, source } => {
            assert_eq!(operation, "send_message(nomi=nomi-1)");
            assert!(matches!(
                source,
                TransportError::Connect(_) | TransportError::Request(_) | TransportError::Timeout(_)
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
