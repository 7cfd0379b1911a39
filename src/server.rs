//! HTTP routes: the WebSocket endpoint and a health check.

use crate::arena::Arena;
use crate::gateway::{RoomHub, handle_socket};
use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Arena shared between every socket handler.
pub type SharedArena = Arc<Arena<Arc<RoomHub>>>;

/// Builds an arena with a fresh hub.
pub fn shared_arena(seed: Option<u64>) -> SharedArena {
    let hub = Arc::new(RoomHub::new());
    Arc::new(match seed {
        Some(seed) => Arena::with_seed(hub, seed),
        None => Arena::new(hub),
    })
}

/// Builds the router (shared between the binary and tests).
pub fn build_app(arena: SharedArena) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_upgrade_handler))
        .with_state(arena)
}

/// Serves `arena` on `listener` until the process stops.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, arena: SharedArena) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Server ready at ws://{}/ws", addr);
    axum::serve(listener, build_app(arena)).await
}

async fn health_handler(State(arena): State<SharedArena>) -> impl IntoResponse {
    match arena.phase_counts() {
        Ok((pending, active, ended)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "connections": arena.outbox().connection_count(),
                "matches": { "pending": pending, "active": active, "ended": ended },
            })),
        ),
        Err(err) => {
            warn!(error = %err, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "error", "message": err.to_string() })),
            )
        }
    }
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(arena): State<SharedArena>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, arena))
}
