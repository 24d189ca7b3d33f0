//! Per-match state machine.
//!
//! ```text
//! SelectingMode --select_mode--> InProgress --terminal move--> Terminal
//!       ^                          ^    |                        |
//!       |                          +----+ reset                  |
//!       +------------------ change_mode -------------------------+
//! ```
//!
//! Every transition runs through `Rules::apply_move` first; collaborators
//! are only told about a change after it has been accepted.

use im::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::collaborators::{MatchView, NoReward, Notice, NullPresentation, Presentation, RewardHook};
use super::score::{MemoryScoreStore, Score, ScoreStore};
use crate::ai::{Opponent, StandardOpponent};
use crate::core::{ConfigError, Difficulty, GameRng, Move, MovePayload, Player, SessionConfig};
use crate::rules::{GameRules, InvalidMove, MatchState, Rules, Verdict};

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    SelectingMode,
    InProgress,
    Terminal,
}

/// Who controls each seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// One human against the computer, which plays `ai_role`.
    VsAi { ai_role: Player },
    /// Two humans sharing one device.
    LocalPvp,
    /// One human per peer. The host always plays `Player::One`.
    Networked { local_role: Player },
}

impl Mode {
    #[must_use]
    pub const fn is_networked(self) -> bool {
        matches!(self, Mode::Networked { .. })
    }

    /// True if this side's verdicts count toward the persisted score.
    #[must_use]
    pub const fn is_score_authority(self) -> bool {
        match self {
            Mode::VsAi { .. } | Mode::LocalPvp => true,
            Mode::Networked { local_role } => matches!(local_role, Player::One),
        }
    }

    /// The human seat when playing against the AI.
    #[must_use]
    pub const fn human_role(self) -> Option<Player> {
        match self {
            Mode::VsAi { ai_role } => Some(ai_role.opponent()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),

    #[error("it is not this side's turn")]
    OutOfTurn,

    #[error("no match is in progress")]
    NotInProgress,

    #[error("a match is still in progress")]
    MatchInProgress,

    #[error("only the host may do that")]
    NotHost,

    #[error("waiting for the opponent to connect")]
    PeerUnavailable,
}

/// Owns one match and everything that happens to it.
pub struct SessionCoordinator<R: Rules = GameRules> {
    rules: R,
    difficulty: Difficulty,
    phase: Phase,
    mode: Option<Mode>,
    state: MatchState,
    history: Vector<Move>,
    /// Highest sequence applied on this side, local or remote.
    sequence: u64,
    score: Score,
    peer_present: bool,
    rng: GameRng,
    opponent: Box<dyn Opponent>,
    store: Box<dyn ScoreStore>,
    presentation: Box<dyn Presentation>,
    reward: Box<dyn RewardHook>,
}

impl SessionCoordinator<GameRules> {
    /// Coordinator for the configured game with the built-in AI and
    /// in-memory collaborators.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(GameRules::from_config(config)?)
            .with_difficulty(config.difficulty)
            .with_rng(GameRng::from_optional_seed(config.ai_seed)))
    }
}

impl<R: Rules> SessionCoordinator<R> {
    #[must_use]
    pub fn new(rules: R) -> Self {
        let state = rules.initial_state();
        Self {
            rules,
            difficulty: Difficulty::default(),
            phase: Phase::SelectingMode,
            mode: None,
            state,
            history: Vector::new(),
            sequence: 0,
            score: Score::default(),
            peer_present: false,
            rng: GameRng::from_entropy(),
            opponent: Box::new(StandardOpponent),
            store: Box::new(MemoryScoreStore::new()),
            presentation: Box::new(NullPresentation),
            reward: Box::new(NoReward),
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_opponent(mut self, opponent: impl Opponent + 'static) -> Self {
        self.opponent = Box::new(opponent);
        self
    }

    /// Use `store` for scores, loading this game's score from it.
    #[must_use]
    pub fn with_store(mut self, store: impl ScoreStore + 'static) -> Self {
        self.score = store.load_score(self.game_key());
        self.store = Box::new(store);
        self
    }

    #[must_use]
    pub fn with_presentation(mut self, presentation: impl Presentation + 'static) -> Self {
        self.presentation = Box::new(presentation);
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: impl RewardHook + 'static) -> Self {
        self.reward = Box::new(reward);
        self
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Moves applied on this side since the last reset, oldest first.
    pub fn history(&self) -> &Vector<Move> {
        &self.history
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn game_key(&self) -> &'static str {
        self.rules.kind().key()
    }

    pub fn is_host(&self) -> bool {
        !matches!(self.mode, Some(Mode::Networked { local_role: Player::Two }))
    }

    /// Start a fresh match in `mode`. If the AI moves first it moves now.
    pub fn select_mode(&mut self, mode: Mode) -> Result<(), SessionError> {
        if self.phase == Phase::InProgress {
            return Err(SessionError::MatchInProgress);
        }
        info!(game = self.game_key(), ?mode, "mode selected");
        self.mode = Some(mode);
        self.peer_present = !mode.is_networked();
        self.start_match();
        self.run_ai();
        Ok(())
    }

    /// Leave the current match and go back to mode selection.
    pub fn change_mode(&mut self) {
        debug!(game = self.game_key(), "back to mode selection");
        self.mode = None;
        self.phase = Phase::SelectingMode;
        self.state = self.rules.initial_state();
        self.history.clear();
        self.render();
    }

    /// Submit a move for `player`.
    ///
    /// Local modes trust the caller to pass the seat whose turn it is. A
    /// networked side may only move its own role, and for turn-based games
    /// only while that role is active. Returns the move as applied, with its
    /// sequence number.
    pub fn submit_move(&mut self, player: Player, payload: MovePayload) -> Result<Move, SessionError> {
        let Some(mode) = self.mode.filter(|_| self.phase == Phase::InProgress) else {
            return Err(SessionError::NotInProgress);
        };

        if let Mode::Networked { local_role } = mode {
            if !self.peer_present {
                self.presentation.notice(Notice::WaitingForOpponent);
                return Err(SessionError::PeerUnavailable);
            }
            let turn_based = !self.rules.kind().is_simultaneous();
            if player != local_role || (turn_based && self.state.active_player != player) {
                debug!(game = self.game_key(), %player, "move out of turn");
                self.presentation.notice(Notice::OutOfTurn);
                return Err(SessionError::OutOfTurn);
            }
        }

        let mv = self.apply(player, payload)?;
        self.run_ai();
        Ok(mv)
    }

    /// Start the match over. A networked joiner may not reset.
    ///
    /// Returns the sequence number assigned to the reset.
    pub fn reset(&mut self) -> Result<u64, SessionError> {
        if self.mode.is_none() {
            return Err(SessionError::NotInProgress);
        }
        if !self.is_host() {
            return Err(SessionError::NotHost);
        }
        self.sequence += 1;
        info!(game = self.game_key(), sequence = self.sequence, "match reset");
        self.start_match();
        self.run_ai();
        Ok(self.sequence)
    }

    /// Replace the local state with one accepted from the peer.
    ///
    /// The caller has already checked `sequence` against what it last saw
    /// from the peer. A terminal state is scored here when this side is the
    /// score authority.
    pub fn adopt_remote(&mut self, state: MatchState, sequence: u64) {
        self.sequence = self.sequence.max(sequence);
        let was_terminal = self.state.is_terminal();
        self.state = state;
        debug!(game = self.game_key(), sequence, verdict = ?self.state.verdict, "adopted remote state");

        if self.state.is_terminal() {
            self.phase = Phase::Terminal;
            if !was_terminal {
                self.commit_verdict();
            }
        } else {
            self.phase = Phase::InProgress;
        }
        self.render();
    }

    /// Note a sequence number seen on the channel, so the next local update
    /// is numbered past it.
    pub fn observe_sequence(&mut self, sequence: u64) {
        self.sequence = self.sequence.max(sequence);
    }

    /// Start over because the host said so.
    pub fn apply_remote_reset(&mut self, sequence: u64) {
        self.sequence = self.sequence.max(sequence);
        info!(game = self.game_key(), sequence, "remote reset");
        self.start_match();
    }

    /// Show the host's score. Mirrored scores are never saved.
    pub fn mirror_score(&mut self, score: Score) {
        if self.score != score {
            self.score = score;
            self.render();
        }
    }

    /// Freeze or unfreeze networked input as the peer leaves or arrives.
    pub fn set_peer_present(&mut self, present: bool) {
        if self.peer_present == present {
            return;
        }
        self.peer_present = present;
        let notice = if present {
            Notice::OpponentConnected
        } else {
            Notice::WaitingForOpponent
        };
        self.presentation.notice(notice);
    }

    pub fn peer_present(&self) -> bool {
        self.peer_present
    }

    /// Pass a notice straight to the presentation layer.
    pub fn notify(&mut self, notice: Notice) {
        self.presentation.notice(notice);
    }

    fn start_match(&mut self) {
        self.state = self.rules.initial_state();
        self.history.clear();
        self.phase = Phase::InProgress;
        self.render();
    }

    fn apply(&mut self, player: Player, payload: MovePayload) -> Result<Move, SessionError> {
        let mv = Move::new(player, payload, self.sequence + 1);
        let next = self.rules.apply_move(&self.state, &mv)?;

        self.sequence = mv.sequence;
        self.state = next;
        self.history.push_back(mv);

        if self.state.is_terminal() {
            self.phase = Phase::Terminal;
            info!(game = self.game_key(), verdict = ?self.state.verdict, "match decided");
            self.commit_verdict();
        }
        self.render();
        Ok(mv)
    }

    /// Let the AI play for as long as it holds the move.
    fn run_ai(&mut self) {
        let Some(Mode::VsAi { ai_role }) = self.mode else {
            return;
        };

        while self.phase == Phase::InProgress && self.ai_to_move(ai_role) {
            let Some(payload) = self
                .opponent
                .choose_move(&self.state, ai_role, self.difficulty, &mut self.rng)
            else {
                warn!(game = self.game_key(), "ai found no move");
                return;
            };
            if let Err(err) = self.apply(ai_role, payload) {
                warn!(game = self.game_key(), %err, "ai move rejected");
                return;
            }
        }
    }

    fn ai_to_move(&self, ai_role: Player) -> bool {
        if self.rules.kind().is_simultaneous() {
            // The AI commits only after the human, and only once.
            let human_done = self.rules.legal_moves(&self.state, ai_role.opponent()).is_empty();
            human_done && !self.rules.legal_moves(&self.state, ai_role).is_empty()
        } else {
            self.state.active_player == ai_role
        }
    }

    fn commit_verdict(&mut self) {
        let Some(mode) = self.mode else {
            return;
        };
        let verdict = self.state.verdict;
        if !mode.is_score_authority() {
            return;
        }
        self.score.record(verdict);

        let key = self.game_key();
        if let Err(err) = self.store.save_score(key, &self.score) {
            warn!(game = key, %err, "failed to save score");
        }
        if let (Some(human), Verdict::Win(winner)) = (mode.human_role(), verdict) {
            if human == winner {
                self.reward.on_match_won(key);
            }
        }
    }

    fn render(&mut self) {
        let view = MatchView {
            state: &self.state,
            phase: self.phase,
            mode: self.mode,
            score: &self.score,
        };
        self.presentation.render(&view);
    }
}
