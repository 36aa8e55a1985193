//! # Client Application
//!
//! Wires the persisted session, the relay client and the dispatcher together.
//! The [`RelayClient`] is created here once and shared as an `Arc`; anything
//! that needs to send or observe the relay gets a clone of that handle.
//!
//! ## Lifecycle
//!
//! - [`ClientApp::start`]: connect if a session was persisted; after the
//!   connection failed, a new connection is dispatched into the same state
//! - [`ClientApp::login`]: persist the session, then connect
//! - [`ClientApp::logout`]: disconnect, stop dispatch, forget the session and
//!   the cached notifications
//!
//! Dropping the app disconnects.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::config::Config;
use crate::client::dispatcher::{run_dispatch, RealtimeState};
use crate::client::error::ClientError;
use crate::client::messaging::TypingTracker;
use crate::client::notifications::{NotificationProjector, QueryCache, ToastQueue, NOTIFICATIONS_KEY};
use crate::client::relay::{Connection, Connector, HttpConnector, RelayClient};
use crate::client::session::{Session, SessionStore};

pub struct ClientApp {
    config: Config,
    sessions: SessionStore,
    relay: Arc<RelayClient>,
    cache: QueryCache,
    toasts: ToastQueue,
    state: Option<Arc<Mutex<RealtimeState>>>,
    dispatcher: Option<Dispatcher>,
}

/// Dispatch task and the connection it drains
struct Dispatcher {
    connection_id: Uuid,
    handle: JoinHandle<()>,
}

impl Dispatcher {
    fn serves(&self, connection: &Connection) -> bool {
        self.connection_id == connection.id() && !self.handle.is_finished()
    }
}

impl std::fmt::Debug for ClientApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientApp")
            .field("server_url", &self.config.server_url())
            .field("session", &self.sessions.session().map(|s| &s.user_id))
            .field("relay", &self.relay)
            .finish()
    }
}

impl ClientApp {
    /// Build an app talking to the configured server over HTTP/WebSocket
    pub fn new(config: Config, sessions: SessionStore) -> Self {
        let connector = Arc::new(HttpConnector::new(config.clone()));
        Self::with_connector(config, sessions, connector)
    }

    /// Build an app on a custom connector
    pub fn with_connector(
        config: Config,
        sessions: SessionStore,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let relay = Arc::new(RelayClient::new(connector, config.relay()));
        let toasts = ToastQueue::new(config.relay().toast_duration());
        Self {
            config,
            sessions,
            relay,
            cache: QueryCache::new(),
            toasts,
            state: None,
            dispatcher: None,
        }
    }

    /// Connect with the persisted session.
    ///
    /// Returns `Ok(None)` without touching the network when nobody is signed
    /// in. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<Option<Arc<Connection>>, ClientError> {
        let Some(session) = self.sessions.session().cloned() else {
            tracing::info!("[App] No persisted session, staying offline");
            return Ok(None);
        };

        let connection = self.relay.connect(Some(&session.token))?;
        if self
            .dispatcher
            .as_ref()
            .is_some_and(|dispatcher| dispatcher.serves(&connection))
        {
            return Ok(Some(connection));
        }

        // A new connection gets a new subscription; state of the same user
        // carries over.
        if let Some(previous) = self.dispatcher.take() {
            previous.handle.abort();
        }
        let state = match &self.state {
            Some(state) if state.lock().current_user_id() == session.user_id => Arc::clone(state),
            _ => self.new_state(&session),
        };
        let events = connection.subscribe();
        self.dispatcher = Some(Dispatcher {
            connection_id: connection.id(),
            handle: tokio::spawn(run_dispatch(Arc::clone(&state), events)),
        });
        self.state = Some(state);
        tracing::info!(
            "[App] Dispatching connection {} for {}",
            connection.id(),
            session.user_id
        );
        Ok(Some(connection))
    }

    /// Persist `session` and connect with it
    pub fn login(&mut self, session: Session) -> Result<Arc<Connection>, ClientError> {
        self.stop_dispatch();
        self.sessions.set_session(session)?;
        self.start()?.ok_or(ClientError::MissingToken)
    }

    /// Disconnect and forget the session
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.relay.disconnect();
        self.stop_dispatch();
        self.cache.invalidate(NOTIFICATIONS_KEY);
        self.sessions.clear_session()?;
        tracing::info!("[App] Logged out");
        Ok(())
    }

    /// Shared relay handle
    pub fn relay(&self) -> Arc<RelayClient> {
        Arc::clone(&self.relay)
    }

    /// Realtime state of the running session
    pub fn state(&self) -> Option<Arc<Mutex<RealtimeState>>> {
        self.state.clone()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn new_state(&self, session: &Session) -> Arc<Mutex<RealtimeState>> {
        let projector = NotificationProjector::new(
            session.user_id.clone(),
            self.cache.clone(),
            self.toasts.clone(),
        );
        let typing = TypingTracker::new(self.config.relay().typing_expiry());
        Arc::new(Mutex::new(RealtimeState::new(
            session.user_id.clone(),
            typing,
            projector,
        )))
    }

    fn stop_dispatch(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.handle.abort();
        }
        self.state = None;
    }
}

impl Drop for ClientApp {
    fn drop(&mut self) {
        self.relay.disconnect();
        self.stop_dispatch();
    }
}
