//! Session configuration.
//!
//! A `SessionConfig` picks the game, the AI strength and the sync wire
//! format. It can be built in code with the `with_*` methods or loaded from
//! a TOML file:
//!
//! ```toml
//! game = "dots_and_boxes"
//! difficulty = "hard"
//! ai_seed = 7
//! wire_format = "json"
//! peer_wait_timeout_secs = 120
//!
//! [dots]
//! rows = 5
//! cols = 5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::rules::GameKind;

/// Smallest and largest supported dot grid side.
pub const MIN_DOTS: u8 = 2;
pub const MAX_DOTS: u8 = 10;

/// AI strength.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Uniformly random legal moves.
    Easy,
    /// Minimax for Tic-Tac-Toe, heuristics for Connect Four and Dots-and-Boxes.
    #[default]
    Hard,
}

/// Dot grid dimensions for Dots-and-Boxes (dots, not boxes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DotsGrid {
    pub rows: u8,
    pub cols: u8,
}

impl DotsGrid {
    #[must_use]
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// Number of boxes the grid encloses.
    #[must_use]
    pub const fn box_count(self) -> usize {
        (self.rows as usize).saturating_sub(1) * (self.cols as usize).saturating_sub(1)
    }
}

impl Default for DotsGrid {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Payload encoding for sync messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    #[default]
    Json,
    Bincode,
}

/// Per-match configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Which game is played.
    pub game: GameKind,

    /// Grid size, only read for Dots-and-Boxes.
    pub dots: DotsGrid,

    /// AI strength in vs-AI mode.
    pub difficulty: Difficulty,

    /// Seed for AI randomness. `None` seeds from entropy.
    pub ai_seed: Option<u64>,

    /// Encoding used on the realtime channel.
    pub wire_format: WireFormat,

    /// How long a networked session waits for the opponent to (re)join
    /// before giving up. `None` waits forever.
    pub peer_wait_timeout_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameKind::TicTacToe,
            dots: DotsGrid::default(),
            difficulty: Difficulty::Hard,
            ai_seed: None,
            wire_format: WireFormat::Json,
            peer_wait_timeout_secs: None,
        }
    }
}

impl SessionConfig {
    /// Default configuration for the given game.
    #[must_use]
    pub fn for_game(game: GameKind) -> Self {
        Self {
            game,
            ..Self::default()
        }
    }

    /// Set the AI difficulty.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Fix the AI seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ai_seed = Some(seed);
        self
    }

    /// Set the Dots-and-Boxes grid.
    #[must_use]
    pub fn with_dots(mut self, rows: u8, cols: u8) -> Self {
        self.dots = DotsGrid::new(rows, cols);
        self
    }

    /// Set the wire format.
    #[must_use]
    pub fn with_wire_format(mut self, format: WireFormat) -> Self {
        self.wire_format = format;
        self
    }

    /// Set the peer wait timeout.
    #[must_use]
    pub fn with_peer_wait_timeout(mut self, timeout: Duration) -> Self {
        self.peer_wait_timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Peer wait timeout as a `Duration`.
    #[must_use]
    pub fn peer_wait_timeout(&self) -> Option<Duration> {
        self.peer_wait_timeout_secs.map(Duration::from_secs)
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let DotsGrid { rows, cols } = self.dots;
        if !(MIN_DOTS..=MAX_DOTS).contains(&rows) || !(MIN_DOTS..=MAX_DOTS).contains(&cols) {
            return Err(ConfigError::DotsGrid { rows, cols });
        }
        if self.peer_wait_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        debug!(game = ?config.game, difficulty = ?config.difficulty, "parsed session config");
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded session config from {}", path.display());
        Ok(config)
    }
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("dots grid {rows}x{cols} outside {MIN_DOTS}..={MAX_DOTS}")]
    DotsGrid { rows: u8, cols: u8 },

    #[error("peer wait timeout must be positive")]
    ZeroTimeout,
}
