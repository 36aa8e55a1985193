//! In-memory relay connector
//!
//! `MockConnector` counts every `open` call. It refuses a configurable number
//! of handshakes, then hands out `MockTransport`s whose inbound side is fed by
//! the test and whose outbound frames are recorded.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::mpsc;

use draftio::client::error::ClientError;
use draftio::client::relay::{Connector, Transport};
use draftio::shared::{Frame, RelayEvent, TransportMode};

pub struct MockConnector {
    /// Opens refused before the connector starts accepting
    refusals: usize,
    opens: AtomicUsize,
    feeds: Mutex<Vec<mpsc::UnboundedSender<Frame>>>,
    sent: Arc<Mutex<Vec<Frame>>>,
}

impl MockConnector {
    pub fn refusing() -> Arc<Self> {
        Arc::new(Self::new(usize::MAX))
    }

    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::new(0))
    }

    /// Refuse the first `refusals` opens, accept the rest
    pub fn refusing_first(refusals: usize) -> Arc<Self> {
        Arc::new(Self::new(refusals))
    }

    fn new(refusals: usize) -> Self {
        Self {
            refusals,
            opens: AtomicUsize::new(0),
            feeds: Mutex::new(Vec::new()),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of `open` calls so far
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Deliver `frame` on the most recently opened transport
    pub fn inject(&self, frame: Frame) -> bool {
        self.feeds
            .lock()
            .last()
            .map(|feed| feed.send(frame).is_ok())
            .unwrap_or(false)
    }

    /// Make every open transport report that the server closed the session
    pub fn drop_transports(&self) {
        self.feeds.lock().clear();
    }

    /// Frames the client sent
    pub fn sent(&self) -> Vec<Frame> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, _token: &str) -> Result<Box<dyn Transport>, ClientError> {
        let attempt = self.opens.fetch_add(1, Ordering::SeqCst);
        if attempt < self.refusals {
            return Err(ClientError::handshake(503, "relay unavailable"));
        }
        let (feed, inbound) = mpsc::unbounded_channel();
        self.feeds.lock().push(feed);
        Ok(Box::new(MockTransport {
            inbound,
            sent: Arc::clone(&self.sent),
        }))
    }
}

pub struct MockTransport {
    inbound: mpsc::UnboundedReceiver<Frame>,
    sent: Arc<Mutex<Vec<Frame>>>,
}

#[async_trait]
impl Transport for MockTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::WebSocket
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), ClientError> {
        self.sent.lock().push(frame.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, ClientError> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) {
        self.inbound.close();
    }
}

/// Everything currently buffered on `events`
pub fn drain_events(events: &mut broadcast::Receiver<RelayEvent>) -> Vec<RelayEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Wait for the next event matching `predicate`
pub async fn next_matching<F>(events: &mut broadcast::Receiver<RelayEvent>, predicate: F) -> RelayEvent
where
    F: Fn(&RelayEvent) -> bool,
{
    loop {
        match events.recv().await {
            Ok(event) if predicate(&event) => return event,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
        }
    }
}
