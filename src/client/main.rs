//! Draft.IO realtime client
//!
//! Headless client: restores (or creates from `DRAFTIO_USER_ID` /
//! `DRAFTIO_TOKEN`) a session, connects to the relay and logs every event
//! until Ctrl-C.

use draftio::client::config::Config;
use draftio::client::session::{Session, SessionStore};
use draftio::client::ClientApp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = Config::new();
    let path = SessionStore::default_path().ok_or("no data directory for client state")?;
    let sessions = SessionStore::load(path);
    tracing::info!("[STARTUP] Relay server {}", config.server_url());

    let mut app = ClientApp::new(config, sessions);

    let connection = match (std::env::var("DRAFTIO_USER_ID"), std::env::var("DRAFTIO_TOKEN")) {
        (Ok(user_id), Ok(token)) => Some(app.login(Session::new(user_id, token))?),
        _ => app.start()?,
    };

    let Some(connection) = connection else {
        tracing::warn!("[STARTUP] Not signed in; set DRAFTIO_USER_ID and DRAFTIO_TOKEN");
        return Ok(());
    };

    let mut events = connection.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[SHUTDOWN] Ctrl-C received");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => tracing::info!("[EVENT] {:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("[EVENT] Skipped {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    app.relay().disconnect();
    Ok(())
}
