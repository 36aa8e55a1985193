//! ClientApp wiring: session-driven connect, dispatch into state, logout

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

use draftio::client::config::Config;
use draftio::client::notifications::NOTIFICATIONS_KEY;
use draftio::client::session::{Session, SessionStore};
use draftio::client::relay::ConnectionState;
use draftio::client::{ClientApp, ConnectionStatus};
use draftio::shared::{EventType, Frame, RelayConfig};
use serde_json::json;

use crate::assert_ok;
use crate::common::MockConnector;

fn app(dir: &TempDir, connector: Arc<MockConnector>) -> ClientApp {
    let config = Config::with_builder(RelayConfig::builder()).expect("default config");
    let sessions = SessionStore::load(dir.path().join("session.json"));
    ClientApp::with_connector(config, sessions, connector)
}

async fn eventually<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

fn message_frame(id: &str, sender: &str, content: &str) -> Frame {
    Frame::new(
        EventType::ReceiveMessage,
        json!({ "id": id, "sender_id": sender, "receiver_id": "me", "content": content }),
    )
}

#[tokio::test]
async fn test_start_without_session_stays_offline() {
    let dir = TempDir::new().unwrap();
    let connector = MockConnector::accepting();
    let mut app = app(&dir, connector.clone());

    assert!(assert_ok!(app.start()).is_none());
    tokio::task::yield_now().await;
    assert_eq!(connector.opens(), 0);
    assert!(app.state().is_none());
}

#[tokio::test]
async fn test_login_projects_inbound_messages() {
    let dir = TempDir::new().unwrap();
    let connector = MockConnector::accepting();
    let mut app = app(&dir, connector.clone());

    assert_ok!(app.login(Session::new("me", "token")));
    let state = app.state().expect("dispatcher running");
    eventually(|| connector.opens() == 1).await;

    state.lock().focus_conversation(Some("u1"));
    eventually(|| connector.inject(message_frame("1", "u1", "open conversation"))).await;
    connector.inject(message_frame("2", "u2", "other conversation"));
    connector.inject(message_frame("2", "u2", "other conversation"));

    eventually(|| state.lock().messages().len() == 3).await;
    let notifications = state.lock().projector().notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].id, "msg-2");
    assert_eq!(app.toasts().active(Instant::now()).len(), 1);
}

#[tokio::test]
async fn test_login_persists_and_restart_reconnects() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = app(&dir, MockConnector::accepting());
        assert_ok!(app.login(Session::new("me", "token")));
    }

    let connector = MockConnector::accepting();
    let mut restarted = app(&dir, connector.clone());
    assert_eq!(restarted.sessions().token(), Some("token"));
    assert!(assert_ok!(restarted.start()).is_some());
    eventually(|| connector.opens() == 1).await;
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let dir = TempDir::new().unwrap();
    let connector = MockConnector::accepting();
    let mut app = app(&dir, connector.clone());

    assert_ok!(app.login(Session::new("me", "token")));
    eventually(|| connector.inject(message_frame("1", "u1", "hi"))).await;
    eventually(|| app.cache().contains(NOTIFICATIONS_KEY)).await;

    assert_ok!(app.logout());
    assert!(app.relay().current().is_none());
    assert!(app.sessions().session().is_none());
    assert!(!app.cache().contains(NOTIFICATIONS_KEY));
    assert!(app.state().is_none());

    let reloaded = SessionStore::load(dir.path().join("session.json"));
    assert!(reloaded.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_typing_indicator_expires() {
    let dir = TempDir::new().unwrap();
    let connector = MockConnector::accepting();
    let mut app = app(&dir, connector.clone());

    assert_ok!(app.login(Session::new("me", "token")));
    let state = app.state().expect("dispatcher running");
    eventually(|| connector.inject(Frame::typing_indicator("u1", true))).await;
    eventually(|| state.lock().is_typing("u1", Instant::now())).await;

    tokio::time::sleep(Duration::from_millis(2_900)).await;
    assert!(state.lock().is_typing("u1", Instant::now()));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!state.lock().is_typing("u1", Instant::now()));
}

#[tokio::test(start_paused = true)]
async fn test_start_after_failure_dispatches_new_connection() {
    let dir = TempDir::new().unwrap();
    // Default policy: one open plus five reconnects, all refused.
    let connector = MockConnector::refusing_first(6);
    let mut app = app(&dir, connector.clone());

    let failed = assert_ok!(app.login(Session::new("me", "token")));
    failed
        .watch_state()
        .wait_for(|state| *state == ConnectionState::Failed)
        .await
        .unwrap();
    let state = app.state().expect("dispatcher running");
    eventually(|| state.lock().status() == ConnectionStatus::Failed).await;

    let restarted = assert_ok!(app.start()).expect("session persisted");
    assert_ne!(restarted.id(), failed.id());
    assert!(Arc::ptr_eq(&state, &app.state().expect("state kept")));
    eventually(|| state.lock().status() == ConnectionStatus::Connected).await;

    eventually(|| connector.inject(message_frame("9", "u9", "back again"))).await;
    eventually(|| state.lock().messages().len() == 1).await;
    assert_eq!(connector.opens(), 7);

    let again = assert_ok!(app.start()).expect("session persisted");
    assert!(Arc::ptr_eq(&again, &restarted));
}
