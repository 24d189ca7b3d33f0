//! Connect Four heuristic: take a win, block a loss, otherwise lean center.

use smallvec::SmallVec;

use crate::core::{GameRng, Player};
use crate::rules::connect_four::{ConnectFourBoard, CENTER_COL, COLS};

/// Probability of taking the most central open column when there is no
/// tactical move.
pub const CENTER_BIAS: f64 = 0.8;

type Columns = SmallVec<[u8; COLS]>;

/// Column for `role`, or `None` if every column is full.
pub fn choose_column(board: &ConnectFourBoard, role: Player, rng: &mut GameRng) -> Option<u8> {
    let open: Columns = board.legal_columns().collect();
    if open.is_empty() {
        return None;
    }

    if let Some(&col) = open.iter().find(|&&c| board.wins_with(role, c)) {
        return Some(col);
    }
    if let Some(&col) = open.iter().find(|&&c| board.wins_with(role.opponent(), c)) {
        return Some(col);
    }

    let ranked = rank_by_center(open);
    if ranked.len() == 1 || rng.gen_bool(CENTER_BIAS) {
        return ranked.first().copied();
    }
    rng.choose(&ranked[1..]).copied()
}

/// Open columns ordered by distance from the center, lower index first on ties.
#[must_use]
pub fn rank_by_center(mut columns: Columns) -> Columns {
    columns.sort_by_key(|&c| (c.abs_diff(CENTER_COL), c));
    columns
}
