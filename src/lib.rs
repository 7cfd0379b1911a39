//! Strictly Matchmaker library - two-player tic-tac-toe matchmaking
//!
//! Clients register over a WebSocket, are paired first-come first-served
//! into matches, and take turns until someone completes a line, the board
//! fills, or a player resigns or disconnects.
//!
//! # Architecture
//!
//! - **Games**: pure board evaluation and the shared turn-parity rule
//! - **Matches**: the match state machine, its invariants and snapshots
//! - **Arena**: one synchronized owner of matches, sessions and the queue
//! - **Gateway**: wire protocol, broadcast rooms and the axum WebSocket adapter
//!
//! # Example
//!
//! ```
//! use strictly_matchmaker::{Arena, RegisterPlayerRequest, RoomHub, StartMatchRequest};
//!
//! let arena = Arena::with_seed(RoomHub::new(), 7);
//! let (conn, _events) = arena.outbox().connect();
//! arena.connect(conn)?;
//! let player = arena.register(conn, RegisterPlayerRequest { user_name: "ada".into() })?;
//! let snapshot = arena.start(conn, StartMatchRequest { player_id: *player.id() })?;
//! assert!(!snapshot.has_started);
//! # Ok::<(), strictly_matchmaker::ArenaError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arena;
mod config;
mod error;
mod games;
mod gateway;
mod matches;
mod matchmaker;
mod player;
mod server;
mod session;

// Crate-level exports - Arena
pub use arena::Arena;

// Crate-level exports - Configuration
pub use config::{ConfigError, HOST_VAR, LOG_VAR, PORT_VAR, SEED_VAR, ServerConfig};

// Crate-level exports - Errors
pub use error::{ArenaError, ErrorKind, InvalidMove, MatchError};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    BOARD_CELLS, Board, MIN_MOVES_TO_WIN, Position, Side, Square, WINNING_LINES, has_winning_line,
    is_full, player_for_side, player_to_move, side_for_index, side_positions, side_to_move,
    winning_line,
};

// Crate-level exports - Gateway
pub use gateway::{
    ClientEvent, ErrorNotice, MakeMoveRequest, Outbox, RegisterPlayerRequest, ResignRequest, Room,
    RoomHub, ServerEvent, StartMatchRequest, handle_frame, handle_socket,
};

// Crate-level exports - Matches
pub use matches::{
    DecidedMeansEnded, DistinctMoves, Invariant, InvariantSet, InvariantViolation, Match, MatchId,
    MatchInvariants, MatchPhase, MatchSnapshot, MatchStore, MonotonicMoves, MoveTransition,
    Outcome, SeatedStarter,
};

// Crate-level exports - Matchmaking
pub use matchmaker::{Pairing, find_or_create};

// Crate-level exports - Players and sessions
pub use player::{Player, PlayerId};
pub use session::{ConnectionId, Session, SessionRegistry};

// Crate-level exports - Server
pub use server::{SharedArena, build_app, serve, shared_arena};
