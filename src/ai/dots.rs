//! Dots-and-Boxes heuristic.
//!
//! Closing a box always wins the tie-break. Otherwise the AI avoids drawing
//! a third side on any box, and only when every remaining edge does so does
//! it pick at random among all of them.

use crate::core::{EdgeLocator, GameRng};
use crate::rules::DotsBoard;

/// Edge to draw, or `None` when the grid is complete.
pub fn choose_edge(board: &DotsBoard, rng: &mut GameRng) -> Option<EdgeLocator> {
    let legal = board.legal_edges();

    if let Some(&edge) = legal.iter().find(|&&e| board.boxes_closed_by(e) > 0) {
        return Some(edge);
    }

    let safe: Vec<EdgeLocator> = legal
        .iter()
        .copied()
        .filter(|&e| !board.hands_over_box(e))
        .collect();
    if let Some(&edge) = rng.choose(&safe) {
        return Some(edge);
    }

    rng.choose(&legal).copied()
}
