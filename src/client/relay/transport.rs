//! Relay Transports
//!
//! A relay session always starts with an HTTP handshake (the long-polling
//! fallback) and is then upgraded to a WebSocket when the server offers it.
//! The WebSocket is never dialed directly: the handshake establishes the
//! session id the socket is bound to, so the two cannot race.
//!
//! # Seams
//!
//! - [`Transport`] moves frames over one established session.
//! - [`Connector`] performs the handshake/upgrade and yields a transport.
//!
//! The connection task only talks to these traits, so tests can substitute
//! an in-memory connector.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::client::config::Config;
use crate::client::error::ClientError;
use crate::shared::{Frame, TransportMode};

/// Upper bound for one long-poll request; the server answers well before.
const POLL_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const INBOUND_BUFFER: usize = 64;

/// One established relay session
#[async_trait]
pub trait Transport: Send {
    /// Transport kind
    fn mode(&self) -> TransportMode;

    /// Deliver one frame to the server
    async fn send(&mut self, frame: &Frame) -> Result<(), ClientError>;

    /// Next inbound frame, `Ok(None)` once the server closed the session.
    ///
    /// Must be cancel-safe: the connection task races it against outbound
    /// frames and cancellation.
    async fn recv(&mut self) -> Result<Option<Frame>, ClientError>;

    /// Release the underlying socket
    async fn close(&mut self);
}

/// Opens authenticated transports
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, token: &str) -> Result<Box<dyn Transport>, ClientError>;
}

/// Handshake response
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Relay session id
    pub sid: String,
    /// Transports the session may upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

impl Handshake {
    pub fn offers_websocket(&self) -> bool {
        self.upgrades.iter().any(|u| u == "websocket")
    }
}

/// Connector speaking HTTP long-polling with WebSocket upgrade
#[derive(Debug, Clone)]
pub struct HttpConnector {
    config: Config,
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Authenticate and obtain a relay session id
    pub async fn handshake(&self, token: &str) -> Result<Handshake, ClientError> {
        let url = self.config.api_url("/relay/handshake");
        tracing::debug!("[RELAY] Handshake: {}", url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "token": token }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::handshake(status.as_u16(), error_text));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn open(&self, token: &str) -> Result<Box<dyn Transport>, ClientError> {
        let handshake = self.handshake(token).await?;
        tracing::info!(
            "[RELAY] Session {} established (upgrades: {:?})",
            handshake.sid,
            handshake.upgrades
        );

        if self.config.relay().allow_upgrade && handshake.offers_websocket() {
            let ws_url = self
                .config
                .ws_url(&format!("/relay/ws?sid={}", handshake.sid));
            match WebSocketTransport::connect(&ws_url).await {
                Ok(transport) => {
                    tracing::info!("[RELAY] Upgraded session {} to WebSocket", handshake.sid);
                    return Ok(Box::new(transport));
                }
                Err(e) => {
                    tracing::warn!(
                        "[RELAY] WebSocket upgrade failed, staying on long-polling: {}",
                        e
                    );
                }
            }
        }

        let poll_url = self
            .config
            .api_url(&format!("/relay/poll?sid={}", handshake.sid));
        Ok(Box::new(PollingTransport::start(self.http.clone(), poll_url)))
    }
}

/// Upgraded WebSocket transport
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::WebSocket
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), ClientError> {
        let text = frame.to_json()?;
        self.stream.send(WsMessage::Text(text.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, ClientError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                WsMessage::Text(text) => match Frame::from_json(text.as_str()) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => tracing::warn!("[RELAY] Skipping undecodable frame: {}", e),
                },
                WsMessage::Close(_) => return Ok(None),
                // Ping/pong are answered by tungstenite itself.
                _ => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!("[RELAY] WebSocket close: {}", e);
        }
    }
}

/// Long-polling transport.
///
/// A background task keeps one poll request outstanding and feeds decoded
/// frames into a channel, which keeps [`Transport::recv`] cancel-safe.
pub struct PollingTransport {
    http: reqwest::Client,
    url: String,
    inbound: mpsc::Receiver<Result<Frame, ClientError>>,
    poller: JoinHandle<()>,
}

impl PollingTransport {
    pub fn start(http: reqwest::Client, url: String) -> Self {
        let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);
        let poller = tokio::spawn(poll_loop(http.clone(), url.clone(), tx));
        Self {
            http,
            url,
            inbound,
            poller,
        }
    }
}

#[async_trait]
impl Transport for PollingTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Polling
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), ClientError> {
        let response = self.http.post(&self.url).json(frame).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::TransportClosed(format!(
                "poll send failed: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, ClientError> {
        match self.inbound.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.poller.abort();
    }
}

impl Drop for PollingTransport {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

async fn poll_loop(
    http: reqwest::Client,
    url: String,
    tx: mpsc::Sender<Result<Frame, ClientError>>,
) {
    loop {
        let frames = match fetch_frames(&http, &url).await {
            Ok(frames) => frames,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };
        for frame in frames {
            if tx.send(Ok(frame)).await.is_err() {
                return;
            }
        }
    }
}

async fn fetch_frames(http: &reqwest::Client, url: &str) -> Result<Vec<Frame>, ClientError> {
    let response = http.get(url).timeout(POLL_REQUEST_TIMEOUT).send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::TransportClosed("relay session expired".into()));
    }
    if !response.status().is_success() {
        return Err(ClientError::TransportClosed(format!(
            "poll failed: {}",
            response.status()
        )));
    }

    let raw: Vec<serde_json::Value> = response.json().await?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Frame>(value) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::warn!("[RELAY] Skipping undecodable frame: {}", e);
                None
            }
        })
        .collect())
}
