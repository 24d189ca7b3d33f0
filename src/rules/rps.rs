//! Rock-Paper-Scissors slots.
//!
//! No board: each player owns one write-once slot. The round resolves only
//! once both slots hold a choice.

use serde::{Deserialize, Serialize};

use super::error::InvalidMove;
use super::Verdict;
use crate::core::{Choice, PerPlayer, Player};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpsSlots {
    slots: PerPlayer<Option<Choice>>,
}

impl RpsSlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn choice(&self, player: Player) -> Option<Choice> {
        self.slots[player]
    }

    #[must_use]
    pub fn both_committed(&self) -> bool {
        self.slots.iter().all(|(_, c)| c.is_some())
    }

    #[must_use]
    pub fn committed_count(&self) -> usize {
        self.slots.iter().filter(|(_, c)| c.is_some()).count()
    }

    /// Record a choice. A filled slot stays locked until reset.
    pub fn commit(&mut self, player: Player, choice: Choice) -> Result<(), InvalidMove> {
        let slot = &mut self.slots[player];
        if slot.is_some() {
            return Err(InvalidMove::ChoiceLocked(player));
        }
        *slot = Some(choice);
        Ok(())
    }

    /// Copy of these slots showing only `player`'s choice.
    #[must_use]
    pub fn only(&self, player: Player) -> Self {
        let mut out = Self::new();
        out.slots[player] = self.slots[player];
        out
    }

    /// Mirror image with the two seats exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            slots: self.slots.swapped(),
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match (self.slots[Player::One], self.slots[Player::Two]) {
            (Some(a), Some(b)) if a == b => Verdict::Draw,
            (Some(a), Some(b)) if a.beats(b) => Verdict::Win(Player::One),
            (Some(_), Some(_)) => Verdict::Win(Player::Two),
            _ => Verdict::InProgress,
        }
    }
}
