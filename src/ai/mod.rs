//! Computer opponents.
//!
//! One `Opponent` trait covers every game. The per-game strategies live in
//! their own modules and take the RNG explicitly, so seeded sessions replay
//! the same AI decisions.

pub mod connect_four;
pub mod dots;
pub mod minimax;
mod opponent;

pub use opponent::{Opponent, StandardOpponent};
