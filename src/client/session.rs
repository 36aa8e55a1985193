//! # Persisted Client State
//!
//! Session and theme state that survives restarts. The store has an explicit
//! serialization boundary: the JSON file is read once when the store is
//! loaded and rewritten after every change.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use draftio::client::session::{Session, SessionStore};
//!
//! let path = SessionStore::default_path().expect("data dir");
//! let mut store = SessionStore::load(path);
//! store.set_session(Session::new("u1", "token")).unwrap();
//! assert!(store.token().is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::error::ClientError;

/// Signed-in user identity and bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// On-disk layout of the state file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PersistedState {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub theme: Theme,
}

/// Load-on-init, save-on-change client state container
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    state: PersistedState,
}

impl SessionStore {
    /// `<data dir>/draftio/session.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("draftio").join("session.json"))
    }

    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store; an unreadable or corrupt file is
    /// logged and also yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt client state at {}: {}", path.display(), e);
                PersistedState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PersistedState::default(),
            Err(e) => {
                tracing::warn!("Failed to read client state at {}: {}", path.display(), e);
                PersistedState::default()
            }
        };
        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Option<&str> {
        self.state.session.as_ref().map(|s| s.token.as_str())
    }

    /// Store a new session (login)
    pub fn set_session(&mut self, session: Session) -> Result<(), ClientError> {
        self.state.session = Some(session);
        self.save()
    }

    /// Forget the session (logout)
    pub fn clear_session(&mut self) -> Result<(), ClientError> {
        if self.state.session.take().is_none() {
            return Ok(());
        }
        self.save()
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), ClientError> {
        if self.state.theme == theme {
            return Ok(());
        }
        self.state.theme = theme;
        self.save()
    }

    fn save(&self) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.state)?;
        // Write then rename; the file is replaced atomically.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("Saved client state to {}", self.path.display());
        Ok(())
    }
}
