//! Board reconstruction from a move sequence.

use super::turn::side_for_index;
use super::{Position, Side};
use serde::{Deserialize, Serialize};

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a side.
    Occupied(Side),
}

/// 3x3 tic-tac-toe board.
///
/// Matches store moves, not boards; a board is rebuilt on demand the same
/// way clients rebuild it from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Squares in row-major order.
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Replays a move sequence, attributing each move by index parity.
    pub fn from_moves(moves: &[Position]) -> Self {
        let mut board = Self::new();
        for (idx, pos) in moves.iter().enumerate() {
            board.squares[pos.index()] = Square::Occupied(side_for_index(idx));
        }
        board
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.index()]
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Positions still open for play.
    pub fn open_positions(&self) -> Vec<Position> {
        Position::ALL
            .into_iter()
            .filter(|pos| self.is_empty(*pos))
            .collect()
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let idx = row * 3 + col;
                let symbol = match self.squares[idx] {
                    Square::Empty => char::from(b'1' + idx as u8),
                    Square::Occupied(side) => side.mark(),
                };
                result.push(symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_marks_by_parity() {
        let board = Board::from_moves(&[Position::Center, Position::TopLeft, Position::BottomRight]);
        assert_eq!(board.get(Position::Center), Square::Occupied(Side::First));
        assert_eq!(board.get(Position::TopLeft), Square::Occupied(Side::Second));
        assert_eq!(board.get(Position::BottomRight), Square::Occupied(Side::First));
        assert_eq!(board.open_positions().len(), 6);
    }

    #[test]
    fn test_display() {
        let board = Board::from_moves(&[Position::TopLeft, Position::Center]);
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|9");
    }
}
