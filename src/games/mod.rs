//! Game rules.

pub mod tictactoe;
