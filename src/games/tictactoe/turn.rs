//! Turn ownership.
//!
//! One rule decides who plays move `k`: the starting player owns every even
//! index, the other player every odd index. Move validation, win evaluation
//! and the snapshot's `nextTurn` all go through the functions here.

use serde::{Deserialize, Serialize};

/// Which side of the match a move belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// The player holding the starting turn (plays X).
    First,
    /// The other player (plays O).
    Second,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Mark drawn for this side on a rendered board.
    pub fn mark(self) -> char {
        match self {
            Side::First => 'X',
            Side::Second => 'O',
        }
    }

    /// Index of this side's first move in the move sequence.
    pub fn first_index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// Side that played (or will play) the move at `index`.
pub fn side_for_index(index: usize) -> Side {
    if index % 2 == 0 {
        Side::First
    } else {
        Side::Second
    }
}

/// Side due to move once `moves_played` moves are on the board.
pub fn side_to_move(moves_played: usize) -> Side {
    side_for_index(moves_played)
}

/// Resolves a side to the concrete player.
pub fn player_for_side<P: Copy>(side: Side, starting: P, other: P) -> P {
    match side {
        Side::First => starting,
        Side::Second => other,
    }
}

/// Player due to move once `moves_played` moves are on the board.
pub fn player_to_move<P: Copy>(starting: P, other: P, moves_played: usize) -> P {
    player_for_side(side_to_move(moves_played), starting, other)
}
