//! Draw detection logic for tic-tac-toe.

use crate::games::tictactoe::Position;

/// Number of cells on the board; also the maximum length of a match.
pub const BOARD_CELLS: usize = 9;

/// Checks if every cell has been played.
///
/// A full board with no winner indicates a draw.
pub fn is_full(moves: &[Position]) -> bool {
    moves.len() >= BOARD_CELLS
}
