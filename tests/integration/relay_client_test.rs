//! RelayClient lifecycle: single connection, bounded reconnect, disconnect

use std::sync::Arc;
use std::time::Duration;

use draftio::client::error::ClientError;
use draftio::client::relay::{ConnectionState, ReconnectPolicy, RelayClient};
use draftio::shared::{Frame, RelayEvent, TransportMode};

use crate::common::{drain_events, next_matching, MockConnector};
use crate::{assert_err, assert_ok};

fn policy() -> ReconnectPolicy {
    ReconnectPolicy::new(Duration::from_secs(1), 5)
}

#[tokio::test]
async fn test_same_token_reuses_connection() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let first = assert_ok!(relay.connect(Some("token-a")));
    let second = assert_ok!(relay.connect(Some("token-a")));
    assert!(Arc::ptr_eq(&first, &second));

    first
        .watch_state()
        .wait_for(|state| matches!(state, ConnectionState::Connected(_)))
        .await
        .unwrap();
    assert_eq!(connector.opens(), 1);
}

#[tokio::test]
async fn test_missing_token_creates_nothing() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    assert_err!(relay.connect(None), ClientError::MissingToken);
    assert_err!(relay.connect(Some("")), ClientError::MissingToken);
    tokio::task::yield_now().await;

    assert!(relay.current().is_none());
    assert_eq!(connector.opens(), 0);
}

#[tokio::test]
async fn test_new_token_replaces_connection() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let first = assert_ok!(relay.connect(Some("token-a")));
    let second = assert_ok!(relay.connect(Some("token-b")));
    assert!(!Arc::ptr_eq(&first, &second));

    first
        .watch_state()
        .wait_for(|state| *state == ConnectionState::Closed)
        .await
        .unwrap();
    assert!(!first.is_live());
    assert!(Arc::ptr_eq(&relay.current().unwrap(), &second));
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_attempts_are_bounded() {
    let connector = MockConnector::refusing();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let connection = assert_ok!(relay.connect(Some("token")));
    let mut events = connection.subscribe();

    connection
        .watch_state()
        .wait_for(|state| *state == ConnectionState::Failed)
        .await
        .unwrap();

    assert_eq!(connector.opens(), 6);

    let events = drain_events(&mut events);
    let errors = events
        .iter()
        .filter(|event| matches!(event, RelayEvent::ConnectionError { .. }))
        .count();
    assert_eq!(errors, 6);
    assert_eq!(events.last(), Some(&RelayEvent::Failed { attempts: 5 }));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.opens(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_after_transport_loss() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let connection = assert_ok!(relay.connect(Some("token")));
    let mut events = connection.subscribe();

    next_matching(&mut events, |e| matches!(e, RelayEvent::Connected { .. })).await;
    connector.drop_transports();

    let lost = next_matching(&mut events, |e| matches!(e, RelayEvent::Disconnected { .. })).await;
    assert!(matches!(lost, RelayEvent::Disconnected { .. }));

    let again = next_matching(&mut events, |e| matches!(e, RelayEvent::Connected { .. })).await;
    assert_eq!(
        again,
        RelayEvent::Connected {
            mode: TransportMode::WebSocket
        }
    );
    assert_eq!(connector.opens(), 2);
    assert!(connection.is_live());
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let connection = assert_ok!(relay.connect(Some("token")));
    connection
        .watch_state()
        .wait_for(|state| matches!(state, ConnectionState::Connected(_)))
        .await
        .unwrap();

    relay.disconnect();
    relay.disconnect();

    connection
        .watch_state()
        .wait_for(|state| *state == ConnectionState::Closed)
        .await
        .unwrap();
    assert!(relay.current().is_none());
    assert_err!(
        connection.send_message("u2", "late").await,
        ClientError::NotConnected
    );
}

#[tokio::test]
async fn test_frames_flow_both_ways() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let connection = assert_ok!(relay.connect(Some("token")));
    let mut events = connection.subscribe();
    next_matching(&mut events, |e| matches!(e, RelayEvent::Connected { .. })).await;

    assert!(connector.inject(Frame::presence("u2", true)));
    assert!(connector.inject(Frame::new(
        draftio::shared::EventType::ReceiveMessage,
        serde_json::json!({ "_id": "m1", "senderId": "u2", "receiverId": "me", "body": "hey" }),
    )));

    let online = events.recv().await.unwrap();
    assert_eq!(
        online,
        RelayEvent::UserOnline {
            user_id: "u2".to_string()
        }
    );
    match events.recv().await.unwrap() {
        RelayEvent::ReceiveMessage(message) => {
            assert_eq!(message.id, "m1");
            assert_eq!(message.content, "hey");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert_ok!(connection.send_typing("u2", true).await);
    assert_ok!(connection.send_message("u2", "hello").await);
    for _ in 0..10 {
        if connector.sent().len() == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(
        connector.sent(),
        vec![Frame::typing("u2", true), Frame::send_message("u2", "hello")]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_first_subscriber_sees_initial_connected() {
    let connector = MockConnector::accepting();
    let relay = RelayClient::with_policy(connector.clone(), policy());

    let connection = assert_ok!(relay.connect(Some("token")));
    connection
        .watch_state()
        .wait_for(|state| matches!(state, ConnectionState::Connected(_)))
        .await
        .unwrap();

    let mut first = connection.subscribe();
    assert_eq!(
        drain_events(&mut first),
        vec![RelayEvent::Connected {
            mode: TransportMode::WebSocket
        }]
    );

    let mut later = connection.subscribe();
    assert!(drain_events(&mut later).is_empty());
}
