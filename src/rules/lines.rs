//! Line scan shared by the grid games.
//!
//! From a freshly placed cell, walk each of the four axes (horizontal,
//! vertical, both diagonals) outward in both signs and count contiguous
//! cells held by the same player. Boards are row-major `Option<Player>`
//! slices.

use crate::core::Player;

/// Axis steps as `(d_row, d_col)`.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A rectangular row-major view over cells.
#[derive(Clone, Copy, Debug)]
pub struct Grid<'a> {
    pub cells: &'a [Option<Player>],
    pub rows: usize,
    pub cols: usize,
}

impl<'a> Grid<'a> {
    #[must_use]
    pub fn new(cells: &'a [Option<Player>], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { cells, rows, cols }
    }

    #[must_use]
    pub fn at(&self, row: i32, col: i32) -> Option<Player> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    /// Contiguous run through `(row, col)` along one axis, counting the cell itself.
    #[must_use]
    pub fn run_through(&self, row: usize, col: usize, (dr, dc): (i32, i32)) -> usize {
        let Some(player) = self.at(row as i32, col as i32) else {
            return 0;
        };

        let mut count = 1;
        for sign in [1, -1] {
            let (mut r, mut c) = (row as i32 + sign * dr, col as i32 + sign * dc);
            while self.at(r, c) == Some(player) {
                count += 1;
                r += sign * dr;
                c += sign * dc;
            }
        }
        count
    }

    /// Longest run through `(row, col)` over all four axes.
    #[must_use]
    pub fn longest_through(&self, row: usize, col: usize) -> usize {
        DIRECTIONS
            .iter()
            .map(|&dir| self.run_through(row, col, dir))
            .max()
            .unwrap_or(0)
    }

    /// True if the mark at `(row, col)` sits on a line of at least `length`.
    #[must_use]
    pub fn completes_line(&self, row: usize, col: usize, length: usize) -> bool {
        self.longest_through(row, col) >= length
    }

    /// First player holding any line of at least `length`, scanning every cell.
    #[must_use]
    pub fn find_line(&self, length: usize) -> Option<Player> {
        (0..self.rows)
            .flat_map(|r| (0..self.cols).map(move |c| (r, c)))
            .find(|&(r, c)| self.completes_line(r, c, length))
            .and_then(|(r, c)| self.at(r as i32, c as i32))
    }
}
