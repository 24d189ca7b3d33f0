//! Core value types shared by every game: players, moves, RNG, configuration.

pub mod config;
pub mod moves;
pub mod player;
pub mod rng;

pub use config::{ConfigError, Difficulty, DotsGrid, SessionConfig, WireFormat};
pub use moves::{Choice, EdgeLocator, Move, MovePayload, Orientation};
pub use player::{PerPlayer, Player};
pub use rng::GameRng;
