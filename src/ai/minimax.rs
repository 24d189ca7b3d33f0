//! Exhaustive minimax for Tic-Tac-Toe.
//!
//! Leaves score +10 for an AI win, -10 for an opponent win and 0 for a draw,
//! with no depth discount. The AI maximizes, the simulated opponent
//! minimizes. Ties between equally scored cells go to the lowest index.

use smallvec::SmallVec;

use crate::core::Player;
use crate::rules::tictactoe::{TicTacToeBoard, CENTER};

pub const WIN_SCORE: i32 = 10;
pub const LOSS_SCORE: i32 = -WIN_SCORE;
pub const DRAW_SCORE: i32 = 0;

/// Optimal cell for `role`, or `None` if the game is already decided.
#[must_use]
pub fn best_move(board: &TicTacToeBoard, role: Player) -> Option<u8> {
    if board.winner().is_some() || board.is_full() {
        return None;
    }
    if board.is_empty() {
        return Some(CENTER);
    }

    let mut scratch = board.clone();
    let cells: SmallVec<[u8; 9]> = board.empty_cells().collect();
    let mut best: Option<(u8, i32)> = None;

    for cell in cells {
        let score = score_after(&mut scratch, role, role, cell);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((cell, score));
        }
    }

    best.map(|(cell, _)| cell)
}

/// Minimax value of the position with `to_move` to play, from `ai`'s side.
#[must_use]
pub fn evaluate(board: &TicTacToeBoard, ai: Player, to_move: Player) -> i32 {
    match board.winner() {
        Some(p) if p == ai => return WIN_SCORE,
        Some(_) => return LOSS_SCORE,
        None if board.is_full() => return DRAW_SCORE,
        None => {}
    }
    let mut scratch = board.clone();
    search(&mut scratch, ai, to_move)
}

fn search(board: &mut TicTacToeBoard, ai: Player, to_move: Player) -> i32 {
    let maximizing = to_move == ai;
    let cells: SmallVec<[u8; 9]> = board.empty_cells().collect();
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for cell in cells {
        let score = score_after(board, ai, to_move, cell);
        best = if maximizing { best.max(score) } else { best.min(score) };
    }

    best
}

/// Play `cell` for `to_move`, score the result, then undo.
fn score_after(board: &mut TicTacToeBoard, ai: Player, to_move: Player, cell: u8) -> i32 {
    let wins = matches!(board.place(to_move, cell), Ok(true));
    let score = if wins {
        if to_move == ai {
            WIN_SCORE
        } else {
            LOSS_SCORE
        }
    } else if board.is_full() {
        DRAW_SCORE
    } else {
        search(board, ai, to_move.opponent())
    };
    board.clear(cell);
    score
}
