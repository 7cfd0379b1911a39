//! Win detection logic for tic-tac-toe.

use crate::games::tictactoe::{Position, Side};
use std::collections::HashSet;
use tracing::instrument;

/// Fewest moves a single side needs to complete a line.
pub const MIN_MOVES_TO_WIN: usize = 3;

/// The 8 winning triples on a 3x3 board.
pub const WINNING_LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Positions played by `side`: every other move starting at the side's
/// first index.
pub fn side_positions(moves: &[Position], side: Side) -> HashSet<Position> {
    moves
        .iter()
        .skip(side.first_index())
        .step_by(2)
        .copied()
        .collect()
}

/// Returns the first completed line held by `side`, if any.
#[instrument(level = "debug")]
pub fn winning_line(moves: &[Position], side: Side) -> Option<[Position; 3]> {
    let played = side_positions(moves, side);
    if played.len() < MIN_MOVES_TO_WIN {
        return None;
    }

    WINNING_LINES
        .into_iter()
        .find(|line| line.iter().all(|pos| played.contains(pos)))
}

/// Checks whether `side` holds all three positions of any winning line.
pub fn has_winning_line(moves: &[Position], side: Side) -> bool {
    winning_line(moves, side).is_some()
}
