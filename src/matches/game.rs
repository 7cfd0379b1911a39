//! Match lifecycle state machine.
//!
//! ```text
//! ┌─────────┐  join   ┌────────┐  win / draw / resign / forfeit  ┌───────┐
//! │ Pending │────────▶│ Active │────────────────────────────────▶│ Ended │
//! └────┬────┘         └────────┘                                 └───────┘
//!      │                 forfeit (abandoned)                         ▲
//!      └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation validates before it touches state, so a rejected request
//! leaves the match exactly as it was.

#[cfg(debug_assertions)]
use super::invariants::{
    Invariant, InvariantSet, InvariantViolation, MatchInvariants, MonotonicMoves, MoveTransition,
};
use super::snapshot::MatchSnapshot;
use super::MatchId;
use crate::error::{InvalidMove, MatchError};
use crate::games::tictactoe::{
    Board, Position, Side, is_full, player_for_side, player_to_move, side_to_move, winning_line,
};
use crate::player::PlayerId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchPhase {
    /// Waiting for a second player.
    Pending,
    /// Both players seated; moves accepted.
    Active,
    /// Terminal.
    Ended,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Outcome {
    /// A player completed a line.
    Win {
        /// The player who completed the line.
        winner: PlayerId,
    },
    /// Nine moves, no line.
    Draw,
    /// A player resigned or disconnected mid-game.
    Resignation {
        /// The player who stayed.
        winner: PlayerId,
    },
    /// The only player left before an opponent arrived.
    Abandoned,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            Outcome::Win { winner } | Outcome::Resignation { winner } => Some(*winner),
            Outcome::Draw | Outcome::Abandoned => None,
        }
    }

    /// Returns true if the match was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// One game between two players, from pairing to outcome.
#[derive(Debug, Clone)]
pub struct Match {
    id: MatchId,
    player_one: PlayerId,
    player_two: Option<PlayerId>,
    starting_turn: Option<PlayerId>,
    moves: Vec<Position>,
    outcome: Option<Outcome>,
}

impl Match {
    /// Creates a pending match with its first player.
    #[instrument]
    pub fn new(id: MatchId, player_one: PlayerId) -> Self {
        info!(match_id = id, %player_one, "Creating pending match");
        Self {
            id,
            player_one,
            player_two: None,
            starting_turn: None,
            moves: Vec::new(),
            outcome: None,
        }
    }

    /// Match id.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Player who created the match.
    pub fn player_one(&self) -> PlayerId {
        self.player_one
    }

    /// Player who joined, once paired.
    pub fn player_two(&self) -> Option<PlayerId> {
        self.player_two
    }

    /// Player holding the first move, once paired.
    pub fn starting_turn(&self) -> Option<PlayerId> {
        self.starting_turn
    }

    /// Moves played so far, in order.
    pub fn moves(&self) -> &[Position] {
        &self.moves
    }

    /// Terminal outcome, if ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        if self.outcome.is_some() {
            MatchPhase::Ended
        } else if self.starting_turn.is_some() {
            MatchPhase::Active
        } else {
            MatchPhase::Pending
        }
    }

    /// Checks whether the player is seated in this match.
    pub fn has_player(&self, player: PlayerId) -> bool {
        self.player_one == player || self.player_two == Some(player)
    }

    /// Returns the other seated player.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if player == self.player_one {
            self.player_two
        } else if self.player_two == Some(player) {
            Some(self.player_one)
        } else {
            None
        }
    }

    /// Player due to move, while active.
    pub fn next_turn(&self) -> Option<PlayerId> {
        if self.phase() != MatchPhase::Active {
            return None;
        }
        let (starting, other) = self.seating()?;
        Some(player_to_move(starting, other, self.moves.len()))
    }

    /// Starting player and the other player, once both are known.
    fn seating(&self) -> Option<(PlayerId, PlayerId)> {
        let starting = self.starting_turn?;
        let other = self.opponent_of(starting)?;
        Some((starting, other))
    }

    /// Seats the second player and draws the starting turn.
    ///
    /// The starting player is picked uniformly from the two players.
    #[instrument(skip(self, rng), fields(match_id = self.id))]
    pub fn join<R: Rng + ?Sized>(&mut self, second: PlayerId, rng: &mut R) -> Result<(), MatchError> {
        match self.phase() {
            MatchPhase::Ended => return Err(MatchError::MatchAlreadyEnded(self.id)),
            MatchPhase::Active => {
                warn!(%second, "Join attempted on an active match");
                return Err(MatchError::NotParticipant);
            }
            MatchPhase::Pending => {}
        }
        if second == self.player_one {
            warn!(%second, "Player tried to join their own match");
            return Err(MatchError::SelfPairing);
        }

        let starting = if rng.random_bool(0.5) {
            self.player_one
        } else {
            second
        };
        self.player_two = Some(second);
        self.starting_turn = Some(starting);

        info!(player_one = %self.player_one, player_two = %second, %starting, "Match started");
        Ok(())
    }

    /// Plays `number` for `player`.
    ///
    /// Validation happens before the move is appended: the match must be
    /// active, the player seated and holding the turn, and the cell on the
    /// board and free.
    #[instrument(skip(self), fields(match_id = self.id))]
    pub fn add_move(&mut self, player: PlayerId, number: u8) -> Result<(), MatchError> {
        let position = self.validate_move(player, number)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let side = side_to_move(self.moves.len());
        self.moves.push(position);
        debug!(%position, %side, moves = self.moves.len(), "Move appended");

        self.settle(side);

        #[cfg(debug_assertions)]
        self.check_postconditions(&before)?;

        Ok(())
    }

    fn validate_move(&self, player: PlayerId, number: u8) -> Result<Position, MatchError> {
        match self.phase() {
            MatchPhase::Ended => return Err(MatchError::MatchAlreadyEnded(self.id)),
            MatchPhase::Pending => return Err(MatchError::MatchNotStarted(self.id)),
            MatchPhase::Active => {}
        }
        if !self.has_player(player) {
            warn!(%player, "Move from a player outside the match");
            return Err(MatchError::NotParticipant);
        }
        if self.next_turn() != Some(player) {
            warn!(%player, expected = ?self.next_turn(), "Player tried to move out of turn");
            return Err(InvalidMove::NotYourTurn.into());
        }
        let position = Position::try_from(number)?;
        if self.moves.contains(&position) {
            warn!(%position, "Move onto occupied square");
            return Err(InvalidMove::Occupied(position).into());
        }
        Ok(position)
    }

    /// Ends the match if the side that just moved won or the board filled.
    fn settle(&mut self, side: Side) {
        let Some((starting, other)) = self.seating() else {
            return;
        };

        if let Some(line) = winning_line(&self.moves, side) {
            let winner = player_for_side(side, starting, other);
            info!(
                %winner,
                line = ?line.map(Position::number),
                "Match won\n{}",
                Board::from_moves(&self.moves).display()
            );
            self.outcome = Some(Outcome::Win { winner });
        } else if is_full(&self.moves) {
            info!("Match ended in a draw");
            self.outcome = Some(Outcome::Draw);
        }
    }

    #[cfg(debug_assertions)]
    fn check_postconditions(&self, before: &Match) -> Result<(), MatchError> {
        let mut violations = MatchInvariants::check_all(self).err().unwrap_or_default();
        if !MonotonicMoves::holds(&MoveTransition::new(before, self)) {
            violations.push(InvariantViolation::new(MonotonicMoves::description()));
        }
        if violations.is_empty() {
            return Ok(());
        }

        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(MatchError::InvariantViolation(format!(
            "Postcondition failed: {}",
            descriptions
        )))
    }

    /// Resigns `player`; the opponent wins.
    ///
    /// Only active matches can be resigned. A pending match has no
    /// opponent to award, so the request is refused with
    /// [`MatchError::MatchNotStarted`].
    #[instrument(skip(self), fields(match_id = self.id))]
    pub fn resign(&mut self, player: PlayerId) -> Result<(), MatchError> {
        match self.phase() {
            MatchPhase::Ended => return Err(MatchError::MatchAlreadyEnded(self.id)),
            MatchPhase::Pending => return Err(MatchError::MatchNotStarted(self.id)),
            MatchPhase::Active => {}
        }
        let winner = self.opponent_of(player).ok_or(MatchError::NotParticipant)?;

        info!(%player, %winner, "Player resigned");
        self.outcome = Some(Outcome::Resignation { winner });
        Ok(())
    }

    /// Ends the match because `player` left.
    ///
    /// An active match is resigned on the player's behalf; a pending one is
    /// abandoned so nobody gets paired into it.
    #[instrument(skip(self), fields(match_id = self.id))]
    pub fn forfeit(&mut self, player: PlayerId) -> Result<(), MatchError> {
        match self.phase() {
            MatchPhase::Active => self.resign(player),
            MatchPhase::Ended => Err(MatchError::MatchAlreadyEnded(self.id)),
            MatchPhase::Pending => {
                if player != self.player_one {
                    return Err(MatchError::NotParticipant);
                }
                info!(%player, "Pending match abandoned");
                self.outcome = Some(Outcome::Abandoned);
                Ok(())
            }
        }
    }

    /// Read-only projection sent to clients.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id,
            player_one_id: self.player_one,
            player_two_id: self.player_two,
            has_started: self.starting_turn.is_some(),
            has_ended: self.outcome.is_some(),
            starting_turn: self.starting_turn,
            moves: self.moves.clone(),
            winner: self.outcome.and_then(|o| o.winner()),
            outcome: self.outcome,
            next_turn: self.next_turn(),
        }
    }
}
