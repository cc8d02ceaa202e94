//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use chatline_core::error::AppError;
use chatline_realtime::{ConnectionSession, ServerEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters of the upgrade request.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is checked and the connection registered in its user's
/// delivery group before the upgrade is accepted. Anonymous requests get a
/// 401 and never touch the registry.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let mut session = state.realtime.open_session();
    if !session.authenticate(query.token.as_deref()).await {
        return Err(AppError::authentication("A valid access token is required").into());
    }
    let outbound = session.subscribe()?;
    let shutdown = state.realtime.shutdown_receiver();

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(session, outbound, shutdown, socket)))
}

/// Drives an accepted connection until either side closes it.
async fn handle_ws_connection(
    mut session: ConnectionSession,
    outbound: mpsc::Receiver<Arc<ServerEvent>>,
    shutdown: broadcast::Receiver<()>,
    socket: WebSocket,
) {
    session.activate();
    let conn_id = session.connection_id();
    let (ws_tx, mut ws_rx) = socket.split();

    info!(conn_id = ?conn_id, "WebSocket connection established");

    let forwarder = tokio::spawn(forward_events(outbound, shutdown, ws_tx));

    // Frames are handled one at a time, in arrival order.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                session.handle_frame(text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = ?conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    session.close();
    forwarder.abort();

    info!(conn_id = ?conn_id, "WebSocket connection closed");
}

/// Writes queued events to the socket until the queue closes, the peer
/// goes away, or the engine shuts down.
async fn forward_events(
    mut outbound: mpsc::Receiver<Arc<ServerEvent>>,
    mut shutdown: broadcast::Receiver<()>,
    mut ws_tx: futures::stream::SplitSink<WebSocket, Message>,
) {
    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else { break };
                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        error!(error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    debug!("Peer went away while forwarding");
                    break;
                }
            }
            _ = shutdown.recv() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    }
}
