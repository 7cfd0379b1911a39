//! Board positions numbered 1-9, row-major.

use crate::error::InvalidMove;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A cell on the tic-tac-toe board.
///
/// Cells are numbered 1-9 left-to-right, top-to-bottom, and travel over the
/// wire as that plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Position {
    /// Top-left (position 1)
    TopLeft = 1,
    /// Top-center (position 2)
    TopCenter = 2,
    /// Top-right (position 3)
    TopRight = 3,
    /// Middle-left (position 4)
    MiddleLeft = 4,
    /// Center (position 5)
    Center = 5,
    /// Middle-right (position 6)
    MiddleRight = 6,
    /// Bottom-left (position 7)
    BottomLeft = 7,
    /// Bottom-center (position 8)
    BottomCenter = 8,
    /// Bottom-right (position 9)
    BottomRight = 9,
}

impl Position {
    /// All 9 positions in board order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Creates a position from its wire number (1-9).
    #[instrument]
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=9 => Some(Self::ALL[usize::from(number - 1)]),
            _ => None,
        }
    }

    /// Returns the wire number (1-9).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Returns the zero-based board index (0-8).
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }
}

impl TryFrom<u8> for Position {
    type Error = InvalidMove;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or(InvalidMove::OutOfBounds(number))
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.number()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}
