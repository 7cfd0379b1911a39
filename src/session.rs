//! Per-connection session tracking.

use crate::error::ArenaError;
use crate::matches::MatchId;
use crate::player::{Player, PlayerId};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Gateway-assigned connection identifier.
pub type ConnectionId = u64;

/// What the server knows about one connection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Registered player, if any.
    pub player: Option<Player>,
    /// Unfinished match the player is seated in, if any.
    pub current_match: Option<MatchId>,
}

/// Maps connections to players and players to their current match.
///
/// The match reference is a back-pointer only; matches are owned by the
/// match store and outlive their sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
    by_player: HashMap<PlayerId, ConnectionId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a freshly opened connection.
    #[instrument(skip(self))]
    pub fn open(&mut self, conn: ConnectionId) {
        debug!("Opening session");
        self.sessions.entry(conn).or_default();
    }

    /// Creates a player for the connection.
    ///
    /// A connection may register again to change its name, but not while
    /// seated in an unfinished match.
    #[instrument(skip(self))]
    pub fn register(&mut self, conn: ConnectionId, user_name: String) -> Result<Player, ArenaError> {
        let session = self.sessions.entry(conn).or_default();
        if let Some(match_id) = session.current_match {
            warn!(match_id, "Re-registration while seated in a match");
            return Err(ArenaError::AlreadyInMatch(match_id));
        }

        let player = Player::new(user_name);
        if let Some(previous) = session.player.replace(player.clone()) {
            self.by_player.remove(previous.id());
        }
        self.by_player.insert(*player.id(), conn);

        info!(player_id = %player.id(), user_name = %player.user_name(), "Registered player");
        Ok(player)
    }

    /// Gets a session.
    pub fn get(&self, conn: ConnectionId) -> Option<&Session> {
        self.sessions.get(&conn)
    }

    /// Player registered on the connection.
    pub fn player(&self, conn: ConnectionId) -> Result<&Player, ArenaError> {
        self.sessions
            .get(&conn)
            .and_then(|s| s.player.as_ref())
            .ok_or(ArenaError::NotRegistered)
    }

    /// Resolves `claimed` against the connection's own player.
    pub fn authorize(&self, conn: ConnectionId, claimed: PlayerId) -> Result<PlayerId, ArenaError> {
        let player = self.player(conn)?;
        if *player.id() != claimed {
            warn!(conn, %claimed, "Payload names another player");
            return Err(ArenaError::UnknownPlayer);
        }
        Ok(claimed)
    }

    /// Unfinished match the connection's player is seated in.
    pub fn current_match(&self, conn: ConnectionId) -> Option<MatchId> {
        self.sessions.get(&conn).and_then(|s| s.current_match)
    }

    /// Connection the player is registered on.
    pub fn connection_of(&self, player: PlayerId) -> Option<ConnectionId> {
        self.by_player.get(&player).copied()
    }

    /// Records that the player has been seated in `match_id`.
    #[instrument(skip(self))]
    pub fn attach_match(&mut self, player: PlayerId, match_id: MatchId) {
        if let Some(session) = self
            .connection_of(player)
            .and_then(|conn| self.sessions.get_mut(&conn))
        {
            session.current_match = Some(match_id);
        }
    }

    /// Clears the match reference of every session seated in `match_id`.
    #[instrument(skip(self))]
    pub fn release_match(&mut self, match_id: MatchId) {
        for session in self.sessions.values_mut() {
            if session.current_match == Some(match_id) {
                session.current_match = None;
            }
        }
    }

    /// Forgets the connection and returns what it held.
    #[instrument(skip(self))]
    pub fn close(&mut self, conn: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&conn)?;
        if let Some(player) = &session.player {
            self.by_player.remove(player.id());
        }
        debug!(has_match = session.current_match.is_some(), "Closed session");
        Some(session)
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True if no connections are open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
