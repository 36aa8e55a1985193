/**
 * WebSocket Transport
 *
 * `GET /relay/ws?sid=` upgrades an existing relay session. Once the upgrade
 * completes, the socket pump owns the session queue until the socket closes;
 * then the session is closed (announcing `user_offline` if it was the
 * user's last one).
 */

use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::relay::polling::{lookup_session, SidQuery};
use crate::backend::relay::hub::RelayHub;
use crate::backend::relay::registry::RelaySession;
use crate::backend::server::state::AppState;
use crate::shared::Frame;

pub async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<SidQuery>,
) -> Result<Response, BackendError> {
    let session = lookup_session(&state, &query.sid)?;
    tracing::debug!("[Relay] Session {} upgrading to websocket", session.sid);
    Ok(ws.on_upgrade(move |socket| {
        let (sink, stream) = socket.split();
        pump(state.hub, session, sink, stream)
    }))
}

/// Drive one attached socket until either side closes.
///
/// The session only counts as upgraded while a pump owns its queue, so an
/// upgrade that never completes leaves it to the idle reaper.
async fn pump<Si, St, E>(hub: RelayHub, session: Arc<RelaySession>, mut sink: Si, mut stream: St)
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut queue = session.queue().await;
    session.mark_upgraded();
    session.touch();

    loop {
        tokio::select! {
            outbound = queue.recv() => {
                let Some(frame) = outbound else { break };
                match frame.to_json() {
                    Ok(text) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            tracing::debug!("[Relay] Send to {} failed: {}", session.sid, e);
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("[Relay] Dropping unserializable frame: {}", e),
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => match Frame::from_json(text.as_str()) {
                    Ok(frame) => {
                        if let Err(e) = hub.handle_frame(&session, frame) {
                            tracing::warn!("[Relay] Rejected frame from {}: {}", session.user_id, e);
                        }
                    }
                    Err(e) => tracing::debug!("[Relay] Undecodable frame from {}: {}", session.sid, e),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => session.touch(),
                Some(Err(e)) => {
                    tracing::debug!("[Relay] Socket {} errored: {}", session.sid, e);
                    break;
                }
            },
        }
    }

    drop(queue);
    hub.close_session(&session.sid);
}
