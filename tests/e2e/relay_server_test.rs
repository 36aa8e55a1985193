//! Two clients talking through a relay server bound to an ephemeral port

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use draftio::backend::auth::create_token;
use draftio::backend::{create_app, ServerConfig};
use draftio::client::config::Config;
use draftio::client::relay::{Connection, HttpConnector, RelayClient};
use draftio::shared::{RelayConfig, RelayEvent, TransportMode};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::broadcast;

use crate::common::next_matching;

const SECRET: &str = "e2e-secret";
const WAIT: Duration = Duration::from_secs(10);

async fn start_server() -> SocketAddr {
    let config = ServerConfig {
        port: 0,
        jwt_secret: SECRET.to_string(),
        poll_timeout: Duration::from_millis(300),
        ..ServerConfig::default()
    };
    let app = create_app(config).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn relay_client(addr: SocketAddr, allow_upgrade: bool) -> RelayClient {
    let config = Config::with_builder(
        RelayConfig::builder()
            .server_url(format!("http://{}", addr))
            .allow_upgrade(allow_upgrade),
    )
    .unwrap();
    RelayClient::new(Arc::new(HttpConnector::new(config.clone())), config.relay())
}

fn connect(relay: &RelayClient, user: &str) -> (Arc<Connection>, broadcast::Receiver<RelayEvent>) {
    let token = create_token(user, SECRET).unwrap();
    let connection = relay.connect(Some(&token)).unwrap();
    let events = connection.subscribe();
    (connection, events)
}

async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(WAIT, future).await.expect("timed out")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_message_delivery_over_websocket() {
    let addr = start_server().await;
    let alice_relay = relay_client(addr, true);
    let bob_relay = relay_client(addr, true);

    let (alice, mut alice_events) = connect(&alice_relay, "alice");
    let connected = within(next_matching(&mut alice_events, |e| {
        matches!(e, RelayEvent::Connected { .. })
    }))
    .await;
    assert_eq!(
        connected,
        RelayEvent::Connected {
            mode: TransportMode::WebSocket
        }
    );

    let (_bob, mut bob_events) = connect(&bob_relay, "bob");
    within(next_matching(&mut bob_events, |e| {
        *e == RelayEvent::UserOnline {
            user_id: "alice".into(),
        }
    }))
    .await;
    within(next_matching(&mut alice_events, |e| {
        *e == RelayEvent::UserOnline { user_id: "bob".into() }
    }))
    .await;

    alice.send_message("bob", "hi bob").await.unwrap();

    let received = within(next_matching(&mut bob_events, |e| {
        matches!(e, RelayEvent::ReceiveMessage(_))
    }))
    .await;
    let message = assert_matches!(received, RelayEvent::ReceiveMessage(message) => message);
    assert_eq!(message.sender_id, "alice");
    assert_eq!(message.receiver_id, "bob");
    assert_eq!(message.content, "hi bob");
    assert_eq!(message.conversation_id, "alice:bob");

    let echoed = within(next_matching(&mut alice_events, |e| {
        matches!(e, RelayEvent::MessageSent(_))
    }))
    .await;
    let echo = assert_matches!(echoed, RelayEvent::MessageSent(echo) => echo);
    assert_eq!(echo.id, message.id);

    alice_relay.disconnect();
    within(next_matching(&mut bob_events, |e| {
        *e == RelayEvent::UserOffline {
            user_id: "alice".into(),
        }
    }))
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_typing_over_long_polling() {
    let addr = start_server().await;
    let alice_relay = relay_client(addr, false);
    let bob_relay = relay_client(addr, false);

    let (alice, mut alice_events) = connect(&alice_relay, "alice");
    let connected = within(next_matching(&mut alice_events, |e| {
        matches!(e, RelayEvent::Connected { .. })
    }))
    .await;
    assert_eq!(
        connected,
        RelayEvent::Connected {
            mode: TransportMode::Polling
        }
    );

    let (_bob, mut bob_events) = connect(&bob_relay, "bob");
    within(next_matching(&mut bob_events, |e| {
        matches!(e, RelayEvent::Connected { .. })
    }))
    .await;

    alice.send_typing("bob", true).await.unwrap();
    let typing = within(next_matching(&mut bob_events, |e| {
        matches!(e, RelayEvent::TypingIndicator { .. })
    }))
    .await;
    assert_eq!(
        typing,
        RelayEvent::TypingIndicator {
            sender_id: "alice".into(),
            is_typing: true,
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pushed_notification_reaches_recipient() {
    let addr = start_server().await;
    let bob_relay = relay_client(addr, true);
    let (_bob, mut bob_events) = connect(&bob_relay, "bob");
    within(next_matching(&mut bob_events, |e| {
        matches!(e, RelayEvent::Connected { .. })
    }))
    .await;

    let http = reqwest::Client::new();
    let url = format!("http://{}/api/notifications", addr);
    let body = json!({
        "recipientId": "bob",
        "type": "follow",
        "title": "New follower",
        "message": "carol followed you"
    });

    let unauthorized = http.post(&url).json(&body).send().await.unwrap();
    assert_eq!(unauthorized.status(), reqwest::StatusCode::UNAUTHORIZED);

    let token = create_token("carol", SECRET).unwrap();
    let accepted = http
        .post(&url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status(), reqwest::StatusCode::ACCEPTED);

    let pushed = within(next_matching(&mut bob_events, |e| {
        matches!(e, RelayEvent::NewNotification(_))
    }))
    .await;
    let notification =
        assert_matches!(pushed, RelayEvent::NewNotification(notification) => notification);
    assert_eq!(notification.recipient_id, "bob");
    assert_eq!(notification.title, "New follower");
    assert_eq!(notification.message, "carol followed you");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handshake_and_poll_errors() {
    let addr = start_server().await;
    let http = reqwest::Client::new();

    let rejected = http
        .post(format!("http://{}/relay/handshake", addr))
        .json(&json!({ "token": "not-a-jwt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::UNAUTHORIZED);

    let unknown = http
        .get(format!("http://{}/relay/poll?sid=missing", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

    let health: serde_json::Value = http
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}
