//! First-class invariants for a match.
//!
//! Invariants are logical properties that must hold throughout a match.
//! `Match::add_move` checks them as postconditions in debug builds, and
//! they are testable on their own.

use super::game::{Match, MatchPhase, Outcome};
use crate::games::tictactoe::{BOARD_CELLS, Side, has_winning_line};
use std::collections::HashSet;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: at most nine moves, no position played twice.
pub struct DistinctMoves;

impl Invariant<Match> for DistinctMoves {
    fn holds(game: &Match) -> bool {
        let moves = game.moves();
        let unique: HashSet<_> = moves.iter().collect();
        moves.len() <= BOARD_CELLS && unique.len() == moves.len()
    }

    fn description() -> &'static str {
        "At most nine moves, each on a distinct position"
    }
}

/// Invariant: the starting turn belongs to a seated player, and moves only
/// exist once a starting turn does.
pub struct SeatedStarter;

impl Invariant<Match> for SeatedStarter {
    fn holds(game: &Match) -> bool {
        match game.starting_turn() {
            Some(starter) => game.has_player(starter) && game.player_two().is_some(),
            None => game.moves().is_empty() && game.player_two().is_none(),
        }
    }

    fn description() -> &'static str {
        "Starting turn is held by one of the two seated players"
    }
}

/// Invariant: a completed line or a full board always ends the match, and
/// a win is credited to the side holding the line.
pub struct DecidedMeansEnded;

impl Invariant<Match> for DecidedMeansEnded {
    fn holds(game: &Match) -> bool {
        let moves = game.moves();
        let first = has_winning_line(moves, Side::First);
        let second = has_winning_line(moves, Side::Second);
        if !(first || second || moves.len() == BOARD_CELLS) {
            return true;
        }
        if game.phase() != MatchPhase::Ended {
            return false;
        }

        match (game.outcome(), game.starting_turn()) {
            (Some(Outcome::Win { winner }), Some(starter)) => {
                (first && winner == starter) || (second && winner != starter)
            }
            // A board can fill without a line only as a draw; resignations
            // end the match before the board decides.
            (Some(Outcome::Draw), _) => !first && !second,
            (Some(Outcome::Resignation { .. }), _) => true,
            _ => false,
        }
    }

    fn description() -> &'static str {
        "A completed line or full board ends the match with the right result"
    }
}

/// All match invariants as a composable set.
pub type MatchInvariants = (DistinctMoves, SeatedStarter, DecidedMeansEnded);

/// A before/after pair around one accepted move.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct MoveTransition<'a> {
    /// State before the move.
    pub before: &'a Match,
    /// State after the move.
    pub after: &'a Match,
}

/// Invariant: moves are append-only; exactly one position is added and the
/// seating never changes.
pub struct MonotonicMoves;

impl<'a> Invariant<MoveTransition<'a>> for MonotonicMoves {
    fn holds(step: &MoveTransition<'a>) -> bool {
        let (before, after) = (step.before, step.after);
        after.moves().len() == before.moves().len() + 1
            && after.moves().starts_with(before.moves())
            && after.starting_turn() == before.starting_turn()
            && after.player_two() == before.player_two()
    }

    fn description() -> &'static str {
        "Moves are append-only and seating is fixed"
    }
}
