//! Tic-Tac-Toe board.
//!
//! Cells are indexed row-major:
//! ```text
//! 0 | 1 | 2
//! --+---+--
//! 3 | 4 | 5
//! --+---+--
//! 6 | 7 | 8
//! ```
//! `Player::One` plays X and moves first.

use serde::{Deserialize, Serialize};

use super::error::InvalidMove;
use super::lines::Grid;
use super::Verdict;
use crate::core::{MovePayload, Player};

pub const SIZE: usize = 3;
pub const CELLS: usize = SIZE * SIZE;
pub const CENTER: u8 = 4;

/// The 8 winning triples.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicTacToeBoard {
    cells: [Option<Player>; CELLS],
}

impl TicTacToeBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from marks, for tests and fixtures.
    #[must_use]
    pub fn from_cells(cells: [Option<Player>; CELLS]) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn cells(&self) -> &[Option<Player>; CELLS] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: u8) -> Option<Player> {
        self.cells.get(index as usize).copied().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Indices of unoccupied cells in ascending order.
    pub fn empty_cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i as u8)
    }

    /// Mark a cell. Returns true if the mark completes a line.
    pub fn place(&mut self, player: Player, index: u8) -> Result<bool, InvalidMove> {
        let slot = self
            .cells
            .get_mut(index as usize)
            .ok_or(InvalidMove::OutOfRange(MovePayload::Cell(index)))?;
        if slot.is_some() {
            return Err(InvalidMove::Occupied(index));
        }
        *slot = Some(player);

        let (row, col) = (index as usize / SIZE, index as usize % SIZE);
        Ok(Grid::new(&self.cells, SIZE, SIZE).completes_line(row, col, SIZE))
    }

    /// Clear a cell. Used by search to undo a trial placement.
    pub(crate) fn clear(&mut self, index: u8) {
        if let Some(slot) = self.cells.get_mut(index as usize) {
            *slot = None;
        }
    }

    /// Winner by the fixed triples.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a]?;
            (self.cells[b] == Some(mark) && self.cells[c] == Some(mark)).then_some(mark)
        })
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self.winner() {
            Some(p) => Verdict::Win(p),
            None if self.is_full() => Verdict::Draw,
            None => Verdict::InProgress,
        }
    }
}
