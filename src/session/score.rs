//! Cumulative win counts and the store that keeps them between sessions.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{PerPlayer, Player};
use crate::rules::Verdict;

/// Wins per player for one game, cumulative across resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub wins: PerPlayer<u32>,
}

impl Score {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn wins(&self, player: Player) -> u32 {
        self.wins[player]
    }

    /// Credit the winner of a decided match. Draws and unfinished matches
    /// leave the score unchanged; returns true if a win was counted.
    pub fn record(&mut self, verdict: Verdict) -> bool {
        match verdict.winner() {
            Some(winner) => {
                self.wins[winner] = self.wins[winner].saturating_add(1);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode score: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence for scores, keyed by `GameKind::key()`.
///
/// Loading never fails: a missing or unreadable entry reads as a zero score.
pub trait ScoreStore: Send {
    fn load_score(&self, game_key: &str) -> Score;

    fn save_score(&mut self, game_key: &str, score: &Score) -> Result<(), StoreError>;
}

/// In-process store. Entries are held as JSON text, the form a key-value
/// backend would persist.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    entries: FxHashMap<String, String>,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one score.
    pub fn with_score(game_key: &str, score: &Score) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.save_score(game_key, score)?;
        Ok(store)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_score(&self, game_key: &str) -> Score {
        self.entries
            .get(game_key)
            .and_then(|text| serde_json::from_str(text).ok())
            .unwrap_or_default()
    }

    fn save_score(&mut self, game_key: &str, score: &Score) -> Result<(), StoreError> {
        let text = serde_json::to_string(score)?;
        self.entries.insert(game_key.to_string(), text);
        Ok(())
    }
}

/// Shared handle, so a store can outlive the coordinator that writes to it.
impl<S: ScoreStore> ScoreStore for Arc<Mutex<S>> {
    fn load_score(&self, game_key: &str) -> Score {
        self.lock().map_or_else(|_| Score::default(), |store| store.load_score(game_key))
    }

    fn save_score(&mut self, game_key: &str, score: &Score) -> Result<(), StoreError> {
        let mut store = self
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        store.save_score(game_key, score)
    }
}
