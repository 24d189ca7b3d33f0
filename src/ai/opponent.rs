use tracing::debug;

use super::{connect_four, dots, minimax};
use crate::core::{Difficulty, GameRng, MovePayload, Player};
use crate::rules::{Board, MatchState};

/// Picks a move for a computer-controlled role.
///
/// Implementations must return a payload the rules accept for `role` on
/// `state`, or `None` when no move is available (decided match, full board,
/// or an already committed RPS slot).
pub trait Opponent: Send {
    fn choose_move(
        &self,
        state: &MatchState,
        role: Player,
        difficulty: Difficulty,
        rng: &mut GameRng,
    ) -> Option<MovePayload>;
}

/// The built-in AI: perfect Tic-Tac-Toe, tactical Connect Four, greedy
/// Dots-and-Boxes and random RPS. `Difficulty::Easy` plays any legal move.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardOpponent;

impl StandardOpponent {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn random_move(board: &Board, role: Player, rng: &mut GameRng) -> Option<MovePayload> {
        let moves = board.legal_moves(role);
        rng.choose(&moves).copied()
    }
}

impl Opponent for StandardOpponent {
    fn choose_move(
        &self,
        state: &MatchState,
        role: Player,
        difficulty: Difficulty,
        rng: &mut GameRng,
    ) -> Option<MovePayload> {
        if state.is_terminal() {
            return None;
        }

        let choice = match (&state.board, difficulty) {
            (board, Difficulty::Easy) => Self::random_move(board, role, rng),
            (Board::TicTacToe(b), Difficulty::Hard) => minimax::best_move(b, role).map(MovePayload::Cell),
            (Board::ConnectFour(b), Difficulty::Hard) => {
                connect_four::choose_column(b, role, rng).map(MovePayload::Column)
            }
            (Board::DotsAndBoxes(b), Difficulty::Hard) => dots::choose_edge(b, rng).map(MovePayload::Edge),
            (board @ Board::RockPaperScissors(_), Difficulty::Hard) => Self::random_move(board, role, rng),
        };

        debug!(game = %state.kind(), ?role, ?choice, "ai move");
        choice
    }
}
