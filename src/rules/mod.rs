//! Rule engines for the four games.
//!
//! Each game keeps its logic on its own board type; `GameRules` implements
//! the `Rules` trait once by dispatching on the `Board` variant, so the
//! session and sync layers never interpret game-specific concepts directly.

pub mod connect_four;
pub mod dots_and_boxes;
pub mod engine;
pub mod error;
pub mod lines;
pub mod rps;
pub mod tictactoe;

pub use connect_four::ConnectFourBoard;
pub use dots_and_boxes::DotsBoard;
pub use engine::{Board, GameKind, GameRules, MatchState, Rules, Verdict};
pub use error::InvalidMove;
pub use rps::RpsSlots;
pub use tictactoe::TicTacToeBoard;
