//! Session Coordinator and its collaborators.

pub mod collaborators;
pub mod coordinator;
pub mod score;

pub use collaborators::{MatchView, NoReward, Notice, NullPresentation, Presentation, RewardHook};
pub use coordinator::{Mode, Phase, SessionCoordinator, SessionError};
pub use score::{MemoryScoreStore, Score, ScoreStore, StoreError};
