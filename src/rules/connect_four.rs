//! Connect Four board.
//!
//! Stored row-major with row 0 at the top:
//! ```text
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Top
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 4: [28][29][30][31][32][33][34]
//! Row 5: [35][36][37][38][39][40][41]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//! Discs drop to the lowest empty row of a column.

use serde::{Deserialize, Serialize};

use super::error::InvalidMove;
use super::lines::Grid;
use super::Verdict;
use crate::core::{MovePayload, Player};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CELLS: usize = ROWS * COLS;
pub const CONNECT: usize = 4;
pub const CENTER_COL: u8 = 3;

/// Where a dropped disc came to rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drop {
    pub row: usize,
    pub col: usize,
    pub wins: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectFourBoard {
    cells: Vec<Option<Player>>,
}

impl Default for ConnectFourBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectFourBoard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![None; CELLS],
        }
    }

    #[inline]
    fn pos(row: usize, col: usize) -> usize {
        row * COLS + col
    }

    fn grid(&self) -> Grid<'_> {
        Grid::new(&self.cells, ROWS, COLS)
    }

    /// False if the cell vector was tampered with (e.g. a bad remote payload).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == CELLS
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        if row >= ROWS || col >= COLS {
            return None;
        }
        self.cells[Self::pos(row, col)]
    }

    /// Row a disc dropped into `col` would land on.
    #[must_use]
    pub fn landing_row(&self, col: u8) -> Option<usize> {
        let col = col as usize;
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[Self::pos(row, col)].is_none())
    }

    /// Columns that still accept a disc, left to right.
    pub fn legal_columns(&self) -> impl Iterator<Item = u8> + '_ {
        (0..COLS as u8).filter(|&c| self.landing_row(c).is_some())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Drop a disc and report where it landed and whether it connects four.
    pub fn drop_disc(&mut self, player: Player, col: u8) -> Result<Drop, InvalidMove> {
        if col as usize >= COLS {
            return Err(InvalidMove::OutOfRange(MovePayload::Column(col)));
        }
        let row = self.landing_row(col).ok_or(InvalidMove::ColumnFull(col))?;
        let col = col as usize;
        self.cells[Self::pos(row, col)] = Some(player);

        let wins = self.grid().completes_line(row, col, CONNECT);
        Ok(Drop { row, col, wins })
    }

    /// Place a disc at an exact cell, ignoring gravity. Fixture helper.
    pub fn set(&mut self, row: usize, col: usize, player: Option<Player>) {
        if row < ROWS && col < COLS {
            self.cells[Self::pos(row, col)] = player;
        }
    }

    /// True if dropping `player`'s disc into `col` wins immediately.
    #[must_use]
    pub fn wins_with(&self, player: Player, col: u8) -> bool {
        let mut trial = self.clone();
        trial.drop_disc(player, col).is_ok_and(|d| d.wins)
    }

    /// Winner by scanning every cell.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.grid().find_line(CONNECT)
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
