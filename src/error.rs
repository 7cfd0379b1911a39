//! Error types for match handling.

use crate::games::tictactoe::Position;
use crate::matches::MatchId;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

/// Why a submitted move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum InvalidMove {
    /// Position outside 1-9.
    #[display("Position {} is off the board (must be 1-9)", _0)]
    OutOfBounds(#[error(not(source))] u8),

    /// Square already taken.
    #[display("Position {} is already occupied", _0)]
    Occupied(#[error(not(source))] Position),

    /// The requester does not hold the turn.
    #[display("It is not your turn")]
    NotYourTurn,
}

/// Errors raised by a single match.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum MatchError {
    /// The move was rejected; the match is unchanged.
    #[display("Invalid move: {}", _0)]
    #[from]
    InvalidMove(InvalidMove),

    /// The match is over and accepts nothing further.
    #[display("Match {} has already ended", _0)]
    MatchAlreadyEnded(#[error(not(source))] MatchId),

    /// The match is still waiting for an opponent.
    #[display("Match {} has not started", _0)]
    MatchNotStarted(#[error(not(source))] MatchId),

    /// The requester is not one of the match's players.
    #[display("Player is not part of this match")]
    NotParticipant,

    /// A player tried to join their own pending match.
    #[display("Player cannot be paired with themselves")]
    SelfPairing,

    /// A postcondition check failed after a move.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(#[error(not(source))] String),
}

/// Errors returned by the arena to the requesting connection.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum ArenaError {
    /// A match-level rejection.
    #[display("{}", _0)]
    #[from]
    Match(MatchError),

    /// The event references a match id that does not exist.
    #[display("Unknown match {}", _0)]
    UnknownMatch(#[error(not(source))] MatchId),

    /// The connection has not registered a player yet.
    #[display("Connection has not registered a player")]
    NotRegistered,

    /// The payload names a player other than the connection's own.
    #[display("Unknown player")]
    UnknownPlayer,

    /// The player is already seated in an unfinished match.
    #[display("Already playing match {}", _0)]
    AlreadyInMatch(#[error(not(source))] MatchId),

    /// Shared state lock was poisoned by a panicking holder.
    #[display("Arena state poisoned")]
    Poisoned,
}

impl From<InvalidMove> for ArenaError {
    fn from(err: InvalidMove) -> Self {
        Self::Match(MatchError::InvalidMove(err))
    }
}

/// Machine-readable error category sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ErrorKind {
    /// See [`ArenaError::UnknownMatch`].
    UnknownMatch,
    /// See [`MatchError::InvalidMove`].
    InvalidMove,
    /// See [`MatchError::MatchAlreadyEnded`].
    MatchAlreadyEnded,
    /// See [`MatchError::MatchNotStarted`].
    MatchNotStarted,
    /// See [`MatchError::NotParticipant`] and [`MatchError::SelfPairing`].
    NotParticipant,
    /// See [`ArenaError::UnknownPlayer`].
    UnknownPlayer,
    /// See [`ArenaError::AlreadyInMatch`].
    AlreadyInMatch,
    /// See [`ArenaError::NotRegistered`].
    NotRegistered,
    /// Frame could not be parsed.
    BadRequest,
    /// Server-side failure.
    Internal,
}

impl MatchError {
    /// Category reported to the client.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMove(_) => ErrorKind::InvalidMove,
            Self::MatchAlreadyEnded(_) => ErrorKind::MatchAlreadyEnded,
            Self::MatchNotStarted(_) => ErrorKind::MatchNotStarted,
            Self::NotParticipant | Self::SelfPairing => ErrorKind::NotParticipant,
            Self::InvariantViolation(_) => ErrorKind::Internal,
        }
    }
}

impl ArenaError {
    /// Category reported to the client.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Match(err) => err.kind(),
            Self::UnknownMatch(_) => ErrorKind::UnknownMatch,
            Self::NotRegistered => ErrorKind::NotRegistered,
            Self::UnknownPlayer => ErrorKind::UnknownPlayer,
            Self::AlreadyInMatch(_) => ErrorKind::AlreadyInMatch,
            Self::Poisoned => ErrorKind::Internal,
        }
    }
}
