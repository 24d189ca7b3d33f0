//! # duel-arcade
//!
//! Two-player turn-based game suite: Tic-Tac-Toe, Connect Four,
//! Dots-and-Boxes and Rock-Paper-Scissors, with an AI opponent per game and
//! a host-authoritative sync protocol for playing one match across two peers
//! over a plain publish/subscribe relay.
//!
//! ## Design Principles
//!
//! 1. **Pure transitions**: `Rules::apply_move` returns the next state and
//!    never touches the input. Scores, rewards and rendering happen only
//!    after a transition is accepted.
//!
//! 2. **One seam per concern**: every game goes through the same `Rules`
//!    and `Opponent` traits; persistence, rewards and presentation are
//!    narrow collaborator traits.
//!
//! 3. **Host authority**: in a networked match only the host resets the
//!    match or commits the score.
//!
//! ## Modules
//!
//! - `core`: players, moves, RNG, configuration
//! - `rules`: board types and the `Rules` trait
//! - `ai`: computer opponents
//! - `session`: the per-match Session Coordinator and its collaborators
//! - `sync`: rooms, wire messages, relay channel, sync protocol, room task

pub mod ai;
pub mod core;
pub mod rules;
pub mod session;
pub mod sync;

// Re-export commonly used types
pub use crate::core::{
    Choice, ConfigError, Difficulty, DotsGrid, EdgeLocator, GameRng, Move, MovePayload, Orientation,
    PerPlayer, Player, SessionConfig, WireFormat,
};

pub use crate::rules::{Board, GameKind, GameRules, InvalidMove, MatchState, Rules, Verdict};

pub use crate::ai::{Opponent, StandardOpponent};

pub use crate::session::{
    MatchView, MemoryScoreStore, Mode, Notice, NullPresentation, Phase, Presentation, RewardHook,
    Score, ScoreStore, SessionCoordinator, SessionError,
};

pub use crate::sync::{
    run_room, InboundOutcome, LocalInput, MemoryRelay, RoomCode, SessionEnd, SyncError, SyncMessage,
    SyncSession,
};
