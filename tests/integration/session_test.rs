//! Persisted client state across store instances

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use draftio::client::session::{PersistedState, Session, SessionStore, Theme};

use crate::assert_ok;

#[test]
fn test_state_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let mut store = SessionStore::load(&path);
    assert_ok!(store.set_session(Session::new("u1", "t1").with_username("ada")));
    assert_ok!(store.set_theme(Theme::Dark));

    let reloaded = SessionStore::load(&path);
    assert_eq!(
        reloaded.state(),
        &PersistedState {
            session: Some(Session::new("u1", "t1").with_username("ada")),
            theme: Theme::Dark,
        }
    );
}

#[test]
fn test_corrupt_file_yields_empty_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = SessionStore::load(&path);
    assert!(store.session().is_none());
    assert_eq!(store.theme(), Theme::Light);

    assert_ok!(store.set_session(Session::new("u2", "t2")));
    assert_eq!(SessionStore::load(&path).token(), Some("t2"));
}
