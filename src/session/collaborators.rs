//! Narrow interfaces to the effect layer.
//!
//! The coordinator calls these only after a transition has been accepted;
//! nothing they do can change the match.

use super::coordinator::{Mode, Phase};
use super::score::Score;
use crate::rules::MatchState;

/// Snapshot handed to the presentation layer after every accepted change.
#[derive(Clone, Copy, Debug)]
pub struct MatchView<'a> {
    pub state: &'a MatchState,
    pub phase: Phase,
    pub mode: Option<Mode>,
    pub score: &'a Score,
}

/// Out-of-band messages for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notice {
    /// A move was attempted when it was not this side's turn. Transient.
    OutOfTurn,
    /// Fewer than two peers are in the room. Blocks input until cleared.
    WaitingForOpponent,
    /// The second peer arrived.
    OpponentConnected,
    /// Both Rock-Paper-Scissors choices are now visible.
    RoundRevealed,
}

pub trait Presentation: Send {
    fn render(&mut self, view: &MatchView<'_>);

    fn notice(&mut self, notice: Notice);
}

/// Presentation that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn render(&mut self, _view: &MatchView<'_>) {}

    fn notice(&mut self, _notice: Notice) {}
}

/// Fired once for each match a human wins against the AI. Fire-and-forget.
pub trait RewardHook: Send {
    fn on_match_won(&mut self, game_key: &str);
}

/// Reward hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReward;

impl RewardHook for NoReward {
    fn on_match_won(&mut self, _game_key: &str) {}
}
