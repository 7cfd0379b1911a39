//! Client-facing transport: wire protocol, broadcast rooms and the
//! WebSocket adapter.

mod outbox;
mod protocol;
mod ws;

pub use outbox::{Outbox, Room, RoomHub};
pub use protocol::{
    ClientEvent, ErrorNotice, MakeMoveRequest, RegisterPlayerRequest, ResignRequest, ServerEvent,
    StartMatchRequest,
};
pub use ws::{handle_frame, handle_socket};

use crate::session::ConnectionId;
use std::sync::Arc;

impl<T: Outbox + ?Sized> Outbox for Arc<T> {
    fn join(&self, conn: ConnectionId, room: Room) {
        (**self).join(conn, room)
    }

    fn leave_all(&self, conn: ConnectionId) {
        (**self).leave_all(conn)
    }

    fn publish(&self, room: Room, event: ServerEvent) {
        (**self).publish(room, event)
    }

    fn send(&self, conn: ConnectionId, event: ServerEvent) {
        (**self).send(conn, event)
    }
}
