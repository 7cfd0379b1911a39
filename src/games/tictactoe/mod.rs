//! Tic-tac-toe board, positions and rules.

mod board;
mod position;
mod rules;
mod turn;

pub use board::{Board, Square};
pub use position::Position;
pub use rules::{
    BOARD_CELLS, MIN_MOVES_TO_WIN, WINNING_LINES, has_winning_line, is_full, side_positions,
    winning_line,
};
pub use turn::{Side, player_for_side, player_to_move, side_for_index, side_to_move};
