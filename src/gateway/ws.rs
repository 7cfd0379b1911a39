//! WebSocket adapter between sockets and the arena.

use super::outbox::{Outbox, RoomHub};
use super::protocol::{ClientEvent, ErrorNotice, ServerEvent};
use crate::arena::Arena;
use crate::error::ErrorKind;
use crate::session::ConnectionId;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Serves one socket until the client goes away.
///
/// Frames are read and dispatched one at a time; a separate task drains
/// the connection's channel into the socket. On close the player's
/// unfinished match is forfeited.
pub async fn handle_socket(socket: WebSocket, arena: Arc<Arena<Arc<RoomHub>>>) {
    let hub = Arc::clone(arena.outbox());
    let (conn, mut rx) = hub.connect();
    if let Err(err) = arena.connect(conn) {
        error!(conn, error = %err, "Could not open session");
        hub.disconnect(conn);
        return;
    }
    info!(conn, "Client connected");

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    warn!(conn, error = %err, "Could not encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!(conn, "Socket closed while writing");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_frame(&*arena, conn, text.as_str()),
            Ok(Message::Binary(_)) => reject(&*arena, conn, "Binary frames are not supported"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(conn, error = %err, "Socket read failed");
                break;
            }
        }
    }

    if let Err(err) = arena.disconnect(conn) {
        error!(conn, error = %err, "Disconnect cleanup failed");
    }
    hub.disconnect(conn);
    if let Err(err) = writer.await {
        warn!(conn, error = %err, "Writer task failed");
    }
    info!(conn, "Client disconnected");
}

/// Parses one text frame and dispatches it.
///
/// Unparseable frames get a `badRequest` error back; nothing else changes.
#[instrument(skip(arena, text))]
pub fn handle_frame<O: Outbox>(arena: &Arena<O>, conn: ConnectionId, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => arena.dispatch(conn, event),
        Err(err) => reject(arena, conn, &format!("Malformed event: {err}")),
    }
}

fn reject<O: Outbox>(arena: &Arena<O>, conn: ConnectionId, message: &str) {
    warn!(conn, reason = message, "Bad request");
    arena.outbox().send(
        conn,
        ServerEvent::Error(ErrorNotice::new(ErrorKind::BadRequest, message)),
    );
}
