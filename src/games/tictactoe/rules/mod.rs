//! Game rules for tic-tac-toe.
//!
//! Pure functions over a match's move sequence. Rules are kept apart from
//! match state so the same evaluation backs server validation and tests.

mod draw;
mod win;

pub use draw::{BOARD_CELLS, is_full};
pub use win::{MIN_MOVES_TO_WIN, WINNING_LINES, has_winning_line, side_positions, winning_line};
