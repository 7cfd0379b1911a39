//! Broadcast grouping and per-connection delivery.

use super::protocol::ServerEvent;
use crate::matches::MatchId;
use crate::player::PlayerId;
use crate::session::ConnectionId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

/// A broadcast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Room {
    /// Every connection of one player.
    #[display("player:{}", _0)]
    Player(PlayerId),
    /// Every participant of one match.
    #[display("match:{}", _0)]
    Match(MatchId),
}

/// Where the arena sends its outbound events.
///
/// Implementations must deliver events published to one room in the order
/// they were published.
pub trait Outbox: Send + Sync {
    /// Adds the connection to a room.
    fn join(&self, conn: ConnectionId, room: Room);

    /// Removes the connection from every room.
    fn leave_all(&self, conn: ConnectionId);

    /// Sends an event to every member of a room.
    fn publish(&self, room: Room, event: ServerEvent);

    /// Sends an event to one connection.
    fn send(&self, conn: ConnectionId, event: ServerEvent);
}

#[derive(Debug, Default)]
struct HubState {
    clients: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    rooms: HashMap<Room, HashSet<ConnectionId>>,
}

/// In-process [`Outbox`] backed by one unbounded channel per connection.
#[derive(Debug, Default)]
pub struct RoomHub {
    state: Mutex<HubState>,
    next_id: AtomicU64,
}

impl RoomHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        // Hub state stays consistent across a panic; keep serving.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates a connection and returns the receiving end of its channel.
    #[instrument(skip(self))]
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let conn = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().clients.insert(conn, tx);
        debug!(conn, "Connection attached to hub");
        (conn, rx)
    }

    /// Drops the connection's channel and room memberships.
    #[instrument(skip(self))]
    pub fn disconnect(&self, conn: ConnectionId) {
        let mut state = self.state();
        remove_from_rooms(&mut state, conn);
        state.clients.remove(&conn);
        debug!(conn, "Connection detached from hub");
    }

    /// Connections currently in `room`.
    pub fn members(&self, room: Room) -> Vec<ConnectionId> {
        self.state()
            .rooms
            .get(&room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of attached connections.
    pub fn connection_count(&self) -> usize {
        self.state().clients.len()
    }
}

fn remove_from_rooms(state: &mut HubState, conn: ConnectionId) {
    state.rooms.retain(|_, members| {
        members.remove(&conn);
        !members.is_empty()
    });
}

impl Outbox for RoomHub {
    fn join(&self, conn: ConnectionId, room: Room) {
        trace!(conn, %room, "Joining room");
        self.state().rooms.entry(room).or_default().insert(conn);
    }

    fn leave_all(&self, conn: ConnectionId) {
        remove_from_rooms(&mut self.state(), conn);
    }

    fn publish(&self, room: Room, event: ServerEvent) {
        let state = self.state();
        let Some(members) = state.rooms.get(&room) else {
            debug!(%room, "Publish to empty room");
            return;
        };
        for conn in members {
            if let Some(tx) = state.clients.get(conn)
                && tx.send(event.clone()).is_err()
            {
                debug!(conn, %room, "Receiver gone, dropping event");
            }
        }
    }

    fn send(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(tx) = self.state().clients.get(&conn)
            && tx.send(event).is_err()
        {
            debug!(conn, "Receiver gone, dropping event");
        }
    }
}
