//! Wire protocol between clients and the server.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`.

use crate::error::{ArenaError, ErrorKind};
use crate::matches::{MatchId, MatchSnapshot};
use crate::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Request for registering a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPlayerRequest {
    /// Display name.
    pub user_name: String,
}

/// Request to be paired into a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMatchRequest {
    /// The requester's player id.
    pub player_id: PlayerId,
}

/// Request for making a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    /// Match to play in.
    pub match_id: MatchId,
    /// Position on board (1-9, where 1=top-left, 9=bottom-right).
    pub position: u8,
}

/// Request to resign a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResignRequest {
    /// The resigning player.
    pub player_id: PlayerId,
    /// Match to resign.
    pub match_id: MatchId,
}

/// Inbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Create a player for this connection.
    Register(RegisterPlayerRequest),
    /// Find or create a match.
    Start(StartMatchRequest),
    /// Play a position.
    Move(MakeMoveRequest),
    /// Give up the match.
    Resign(ResignRequest),
}

/// Error notice sent to the requesting connection only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    /// Machine-readable category.
    pub kind: ErrorKind,
    /// Human-readable explanation.
    pub message: String,
}

impl ErrorNotice {
    /// Creates a notice.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&ArenaError> for ErrorNotice {
    fn from(err: &ArenaError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Outbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Registration confirmed: `{id, userName}`.
    Registered(Player),
    /// Current match state.
    Match(MatchSnapshot),
    /// A request was refused.
    Error(ErrorNotice),
}
