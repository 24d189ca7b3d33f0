//! Move representation: who moved, what they chose, and the sequence stamp.
//!
//! The payload is game-specific:
//! - Tic-Tac-Toe: a cell index `0..9`
//! - Connect Four: a column index `0..7`
//! - Dots-and-Boxes: an edge locator
//! - Rock-Paper-Scissors: a choice
//!
//! ```
//! use duel_arcade::core::{Move, MovePayload, Player};
//!
//! let mv = Move::new(Player::One, MovePayload::Cell(4), 1);
//! assert_eq!(mv.payload, MovePayload::Cell(4));
//! ```

use serde::{Deserialize, Serialize};

use super::player::Player;

/// Edge direction in a Dots-and-Boxes grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Joins dot `(row, col)` to dot `(row, col + 1)`.
    Horizontal,
    /// Joins dot `(row, col)` to dot `(row + 1, col)`.
    Vertical,
}

/// Position of one edge, addressed by its top/left dot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeLocator {
    pub orientation: Orientation,
    pub row: u8,
    pub col: u8,
}

impl EdgeLocator {
    #[must_use]
    pub const fn horizontal(row: u8, col: u8) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            row,
            col,
        }
    }

    #[must_use]
    pub const fn vertical(row: u8, col: u8) -> Self {
        Self {
            orientation: Orientation::Vertical,
            row,
            col,
        }
    }
}

impl std::fmt::Display for EdgeLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.orientation {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        };
        write!(f, "{tag}({},{})", self.row, self.col)
    }
}

/// Rock-Paper-Scissors hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    /// The hand this one defeats.
    #[must_use]
    pub const fn defeats(self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Scissors => Choice::Paper,
            Choice::Paper => Choice::Rock,
        }
    }

    #[must_use]
    pub fn beats(self, other: Choice) -> bool {
        self.defeats() == other
    }
}

/// Game-specific part of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePayload {
    Cell(u8),
    Column(u8),
    Edge(EdgeLocator),
    Choice(Choice),
}

/// A complete move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,

    /// What was played.
    pub payload: MovePayload,

    /// Per-room counter assigned by the side holding move authority.
    pub sequence: u64,
}

impl Move {
    #[must_use]
    pub const fn new(player: Player, payload: MovePayload, sequence: u64) -> Self {
        Self {
            player,
            payload,
            sequence,
        }
    }
}
