//! Relay Connection
//!
//! A [`Connection`] is the handle to one relay session's background task.
//! The task owns the transport, reconnects with the fixed-delay policy, and
//! publishes decoded events on a broadcast channel in the order the
//! transport yields them.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::client::relay::retry::ReconnectPolicy;
use crate::client::relay::transport::{Connector, Transport};
use crate::shared::{Frame, RelayEvent, TransportMode};

const EVENT_CAPACITY: usize = 256;
const OUTBOUND_CAPACITY: usize = 64;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// First handshake in progress
    Connecting,
    /// Transport established
    Connected(TransportMode),
    /// Waiting for or performing reconnect attempt `attempt`
    Reconnecting { attempt: u32 },
    /// Reconnect attempts exhausted
    Failed,
    /// Torn down by `disconnect`
    Closed,
}

impl ConnectionState {
    /// Whether the connection may still deliver events without a new `connect`
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Failed | Self::Closed)
    }
}

/// Handle to a relay session
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    token: String,
    events: broadcast::Sender<RelayEvent>,
    /// Subscribed before the task starts; handed to the first subscriber
    first_receiver: Mutex<Option<broadcast::Receiver<RelayEvent>>>,
    outbound: mpsc::Sender<Frame>,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl Connection {
    /// Spawn the connection task. Must be called inside a tokio runtime.
    pub(crate) fn spawn(
        connector: Arc<dyn Connector>,
        token: String,
        policy: ReconnectPolicy,
    ) -> Self {
        let (events, first_receiver) = broadcast::channel(EVENT_CAPACITY);
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let cancel = CancellationToken::new();
        let id = Uuid::new_v4();

        let task = ConnectionTask {
            id,
            connector,
            token: token.clone(),
            policy,
            events: events.clone(),
            outbound: outbound_rx,
            state: state_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(task.run());

        Self {
            id,
            token,
            events,
            first_receiver: Mutex::new(Some(first_receiver)),
            outbound,
            state,
            cancel,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// Subscribe to inbound events.
    ///
    /// The first subscriber sees every event since the connection was
    /// spawned, including the first `Connected`; later ones see events from
    /// now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.first_receiver
            .lock()
            .take()
            .unwrap_or_else(|| self.events.subscribe())
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && self.state().is_live()
    }

    /// Send a direct message; queued while reconnecting
    pub async fn send_message(&self, receiver_id: &str, content: &str) -> Result<(), ClientError> {
        self.send(Frame::send_message(receiver_id, content)).await
    }

    /// Report typing state for the conversation with `receiver_id`
    pub async fn send_typing(&self, receiver_id: &str, is_typing: bool) -> Result<(), ClientError> {
        self.send(Frame::typing(receiver_id, is_typing)).await
    }

    async fn send(&self, frame: Frame) -> Result<(), ClientError> {
        if !self.is_live() {
            return Err(ClientError::NotConnected);
        }
        self.outbound
            .send(frame)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Stop the task and release the transport. Only the owner calls this.
    pub(crate) fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

enum PumpOutcome {
    /// Disconnect requested
    Cancelled,
    /// Transport went away
    Lost(String),
}

struct ConnectionTask {
    id: Uuid,
    connector: Arc<dyn Connector>,
    token: String,
    policy: ReconnectPolicy,
    events: broadcast::Sender<RelayEvent>,
    outbound: mpsc::Receiver<Frame>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl ConnectionTask {
    async fn run(mut self) {
        tracing::info!("[RELAY] Connection {} starting", self.id);
        let mut failures: u32 = 0;

        loop {
            let opened = tokio::select! {
                _ = self.cancel.cancelled() => break,
                opened = self.connector.open(&self.token) => opened,
            };

            match opened {
                Ok(mut transport) => {
                    failures = 0;
                    let mode = transport.mode();
                    tracing::info!("[RELAY] Connection {} established over {:?}", self.id, mode);
                    self.state.send_replace(ConnectionState::Connected(mode));
                    self.emit(RelayEvent::Connected { mode });

                    let outcome = self.pump(transport.as_mut()).await;
                    transport.close().await;
                    match outcome {
                        PumpOutcome::Cancelled => break,
                        PumpOutcome::Lost(reason) => {
                            tracing::warn!("[RELAY] Connection {} lost: {}", self.id, reason);
                            self.emit(RelayEvent::Disconnected { reason });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("[RELAY] Connection {} failed to open: {}", self.id, e);
                    self.emit(RelayEvent::ConnectionError {
                        message: e.to_string(),
                    });
                }
            }

            failures += 1;
            let Some(delay) = self.policy.delay_for(failures) else {
                tracing::error!(
                    "[RELAY] Connection {} giving up after {} reconnect attempts",
                    self.id,
                    self.policy.max_attempts
                );
                self.state.send_replace(ConnectionState::Failed);
                self.emit(RelayEvent::Failed {
                    attempts: self.policy.max_attempts,
                });
                return;
            };

            self.state
                .send_replace(ConnectionState::Reconnecting { attempt: failures });
            tracing::info!(
                "[RELAY] Reconnect attempt {}/{} in {:?}",
                failures,
                self.policy.max_attempts,
                delay
            );
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.state.send_replace(ConnectionState::Closed);
        tracing::info!("[RELAY] Connection {} closed", self.id);
    }

    async fn pump(&mut self, transport: &mut dyn Transport) -> PumpOutcome {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return PumpOutcome::Cancelled,
                inbound = transport.recv() => match inbound {
                    Ok(Some(frame)) => self.dispatch(&frame),
                    Ok(None) => return PumpOutcome::Lost("server closed the session".to_string()),
                    Err(e) => return PumpOutcome::Lost(e.to_string()),
                },
                outbound = self.outbound.recv() => match outbound {
                    Some(frame) => {
                        if let Err(e) = transport.send(&frame).await {
                            return PumpOutcome::Lost(e.to_string());
                        }
                    }
                    None => return PumpOutcome::Cancelled,
                },
            }
        }
    }

    fn dispatch(&self, frame: &Frame) {
        match RelayEvent::from_frame(frame) {
            Some(event) => self.emit(event),
            None => tracing::debug!("[RELAY] Ignoring frame '{}'", frame.event),
        }
    }

    fn emit(&self, event: RelayEvent) {
        // No subscribers is fine: nobody is listening yet.
        let _ = self.events.send(event);
    }
}
