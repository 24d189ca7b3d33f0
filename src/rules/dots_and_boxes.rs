//! Dots-and-Boxes board.
//!
//! A grid of `rows x cols` dots carries three parallel grids:
//! - horizontal edges: `rows x (cols - 1)`
//! - vertical edges: `(rows - 1) x cols`
//! - boxes: `(rows - 1) x (cols - 1)`
//!
//! Box `(r, c)` is bounded by `H(r, c)`, `H(r + 1, c)`, `V(r, c)` and
//! `V(r, c + 1)`. Drawing the fourth side of a box claims it for the mover.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::InvalidMove;
use super::Verdict;
use crate::core::{DotsGrid, EdgeLocator, MovePayload, Orientation, PerPlayer, Player};

/// Box coordinates `(row, col)`.
pub type BoxPos = (usize, usize);

/// The one or two boxes an edge borders.
pub type Neighbours = SmallVec<[BoxPos; 2]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DotsBoard {
    grid: DotsGrid,
    horizontal: Vec<Option<Player>>,
    vertical: Vec<Option<Player>>,
    boxes: Vec<Option<Player>>,
}

impl DotsBoard {
    #[must_use]
    pub fn new(grid: DotsGrid) -> Self {
        let (rows, cols) = (grid.rows as usize, grid.cols as usize);
        Self {
            grid,
            horizontal: vec![None; rows * cols.saturating_sub(1)],
            vertical: vec![None; rows.saturating_sub(1) * cols],
            boxes: vec![None; grid.box_count()],
        }
    }

    #[must_use]
    pub fn grid(&self) -> DotsGrid {
        self.grid
    }

    fn dot_rows(&self) -> usize {
        self.grid.rows as usize
    }

    fn dot_cols(&self) -> usize {
        self.grid.cols as usize
    }

    fn box_cols(&self) -> usize {
        self.dot_cols().saturating_sub(1)
    }

    /// False if grid lengths disagree with the declared dimensions.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let (rows, cols) = (self.dot_rows(), self.dot_cols());
        rows >= 2
            && cols >= 2
            && self.horizontal.len() == rows * (cols - 1)
            && self.vertical.len() == (rows - 1) * cols
            && self.boxes.len() == (rows - 1) * (cols - 1)
    }

    fn edge_slot(&self, edge: EdgeLocator) -> Option<(Orientation, usize)> {
        let (row, col) = (edge.row as usize, edge.col as usize);
        let (rows, cols) = (self.dot_rows(), self.dot_cols());
        match edge.orientation {
            Orientation::Horizontal if row < rows && col + 1 < cols => {
                Some((Orientation::Horizontal, row * (cols - 1) + col))
            }
            Orientation::Vertical if row + 1 < rows && col < cols => {
                Some((Orientation::Vertical, row * cols + col))
            }
            _ => None,
        }
    }

    /// Who drew an edge, if anyone. Off-grid edges read as unset.
    #[must_use]
    pub fn edge(&self, edge: EdgeLocator) -> Option<Player> {
        match self.edge_slot(edge)? {
            (Orientation::Horizontal, i) => self.horizontal[i],
            (Orientation::Vertical, i) => self.vertical[i],
        }
    }

    #[must_use]
    pub fn is_set(&self, edge: EdgeLocator) -> bool {
        self.edge(edge).is_some()
    }

    /// Owner of box `(row, col)`.
    #[must_use]
    pub fn box_owner(&self, (row, col): BoxPos) -> Option<Player> {
        self.boxes.get(row * self.box_cols() + col).copied().flatten()
    }

    /// The four edges bounding a box.
    #[must_use]
    pub fn box_edges((row, col): BoxPos) -> [EdgeLocator; 4] {
        let (r, c) = (row as u8, col as u8);
        [
            EdgeLocator::horizontal(r, c),
            EdgeLocator::horizontal(r + 1, c),
            EdgeLocator::vertical(r, c),
            EdgeLocator::vertical(r, c + 1),
        ]
    }

    /// Number of drawn sides of a box.
    #[must_use]
    pub fn sides_drawn(&self, pos: BoxPos) -> usize {
        Self::box_edges(pos).iter().filter(|&&e| self.is_set(e)).count()
    }

    /// Boxes bordering an edge.
    #[must_use]
    pub fn neighbours(&self, edge: EdgeLocator) -> Neighbours {
        let (row, col) = (edge.row as usize, edge.col as usize);
        let box_rows = self.dot_rows().saturating_sub(1);
        let box_cols = self.box_cols();
        let mut out = Neighbours::new();
        match edge.orientation {
            Orientation::Horizontal => {
                if row > 0 {
                    out.push((row - 1, col));
                }
                if row < box_rows {
                    out.push((row, col));
                }
            }
            Orientation::Vertical => {
                if col > 0 {
                    out.push((row, col - 1));
                }
                if col < box_cols {
                    out.push((row, col));
                }
            }
        }
        out
    }

    /// Every undrawn edge, horizontals first, each in row-major order.
    #[must_use]
    pub fn legal_edges(&self) -> Vec<EdgeLocator> {
        let (rows, cols) = (self.dot_rows() as u8, self.dot_cols() as u8);
        let horizontals = (0..rows).flat_map(|r| (0..cols.saturating_sub(1)).map(move |c| EdgeLocator::horizontal(r, c)));
        let verticals = (0..rows.saturating_sub(1)).flat_map(|r| (0..cols).map(move |c| EdgeLocator::vertical(r, c)));
        horizontals
            .chain(verticals)
            .filter(|&e| !self.is_set(e))
            .collect()
    }

    /// Draw an edge and claim every box it closes. Returns the number claimed.
    pub fn draw(&mut self, player: Player, edge: EdgeLocator) -> Result<usize, InvalidMove> {
        let slot = match self.edge_slot(edge) {
            Some((Orientation::Horizontal, i)) => &mut self.horizontal[i],
            Some((Orientation::Vertical, i)) => &mut self.vertical[i],
            None => return Err(InvalidMove::OutOfRange(MovePayload::Edge(edge))),
        };
        if slot.is_some() {
            return Err(InvalidMove::EdgeTaken(edge));
        }
        *slot = Some(player);

        let mut claimed = 0;
        for pos in self.neighbours(edge) {
            if self.box_owner(pos).is_none() && self.sides_drawn(pos) == 4 {
                let index = pos.0 * self.box_cols() + pos.1;
                self.boxes[index] = Some(player);
                claimed += 1;
            }
        }
        Ok(claimed)
    }

    /// How many boxes drawing `edge` would close right now.
    #[must_use]
    pub fn boxes_closed_by(&self, edge: EdgeLocator) -> usize {
        if self.is_set(edge) {
            return 0;
        }
        self.neighbours(edge)
            .into_iter()
            .filter(|&pos| self.sides_drawn(pos) == 3)
            .count()
    }

    /// True if drawing `edge` leaves some neighbouring box on three sides.
    #[must_use]
    pub fn hands_over_box(&self, edge: EdgeLocator) -> bool {
        self.neighbours(edge)
            .into_iter()
            .any(|pos| self.sides_drawn(pos) == 2)
    }

    /// Boxes claimed by each player.
    #[must_use]
    pub fn tally(&self) -> PerPlayer<usize> {
        let mut tally = PerPlayer::default();
        for owner in self.boxes.iter().flatten() {
            tally[*owner] += 1;
        }
        tally
    }

    #[must_use]
    pub fn claimed_boxes(&self) -> usize {
        self.boxes.iter().filter(|b| b.is_some()).count()
    }

    /// Boxes whose four edges are drawn, whether or not claimed.
    #[must_use]
    pub fn closed_boxes(&self) -> usize {
        let box_rows = self.dot_rows().saturating_sub(1);
        (0..box_rows)
            .flat_map(|r| (0..self.box_cols()).map(move |c| (r, c)))
            .filter(|&pos| self.sides_drawn(pos) == 4)
            .count()
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.claimed_boxes() < self.boxes.len() {
            return Verdict::InProgress;
        }
        let tally = self.tally();
        match tally[Player::One].cmp(&tally[Player::Two]) {
            std::cmp::Ordering::Greater => Verdict::Win(Player::One),
            std::cmp::Ordering::Less => Verdict::Win(Player::Two),
            std::cmp::Ordering::Equal => Verdict::Draw,
        }
    }
}
