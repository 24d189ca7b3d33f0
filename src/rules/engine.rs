//! Rules trait and the shared match state.
//!
//! Every game is reached through the same capability set:
//! - What moves are legal
//! - How a move transforms the state
//! - Whether the match is decided

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::connect_four::ConnectFourBoard;
use super::dots_and_boxes::DotsBoard;
use super::error::InvalidMove;
use super::rps::RpsSlots;
use super::tictactoe::TicTacToeBoard;
use crate::core::{Choice, ConfigError, DotsGrid, Move, MovePayload, Player, SessionConfig};

/// The four games in the suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
    DotsAndBoxes,
    RockPaperScissors,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::TicTacToe,
        GameKind::ConnectFour,
        GameKind::DotsAndBoxes,
        GameKind::RockPaperScissors,
    ];

    /// Stable key used for score persistence.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tic_tac_toe",
            GameKind::ConnectFour => "connect_four",
            GameKind::DotsAndBoxes => "dots_and_boxes",
            GameKind::RockPaperScissors => "rock_paper_scissors",
        }
    }

    /// Both players commit at once instead of alternating.
    #[must_use]
    pub const fn is_simultaneous(self) -> bool {
        matches!(self, GameKind::RockPaperScissors)
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of a match so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    InProgress,
    Win(Player),
    Draw,
}

impl Verdict {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Verdict::InProgress)
    }

    #[must_use]
    pub const fn winner(self) -> Option<Player> {
        match self {
            Verdict::Win(p) => Some(p),
            _ => None,
        }
    }
}

/// Game-specific board, tagged by game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    TicTacToe(TicTacToeBoard),
    ConnectFour(ConnectFourBoard),
    DotsAndBoxes(DotsBoard),
    RockPaperScissors(RpsSlots),
}

impl Board {
    /// Fresh board for a game.
    #[must_use]
    pub fn new(kind: GameKind, dots: DotsGrid) -> Self {
        match kind {
            GameKind::TicTacToe => Board::TicTacToe(TicTacToeBoard::new()),
            GameKind::ConnectFour => Board::ConnectFour(ConnectFourBoard::new()),
            GameKind::DotsAndBoxes => Board::DotsAndBoxes(DotsBoard::new(dots)),
            GameKind::RockPaperScissors => Board::RockPaperScissors(RpsSlots::new()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            Board::TicTacToe(_) => GameKind::TicTacToe,
            Board::ConnectFour(_) => GameKind::ConnectFour,
            Board::DotsAndBoxes(_) => GameKind::DotsAndBoxes,
            Board::RockPaperScissors(_) => GameKind::RockPaperScissors,
        }
    }

    /// Unplayed moves for `player`, ignoring whether the match is decided.
    #[must_use]
    pub fn legal_moves(&self, player: Player) -> Vec<MovePayload> {
        match self {
            Board::TicTacToe(b) => b.empty_cells().map(MovePayload::Cell).collect(),
            Board::ConnectFour(b) => b.legal_columns().map(MovePayload::Column).collect(),
            Board::DotsAndBoxes(b) => b.legal_edges().into_iter().map(MovePayload::Edge).collect(),
            Board::RockPaperScissors(b) => {
                if b.choice(player).is_some() {
                    Vec::new()
                } else {
                    Choice::ALL.into_iter().map(MovePayload::Choice).collect()
                }
            }
        }
    }

    /// Verdict recomputed from the board alone.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self {
            Board::TicTacToe(b) => b.verdict(),
            Board::ConnectFour(b) => b.verdict(),
            Board::DotsAndBoxes(b) => b.verdict(),
            Board::RockPaperScissors(b) => b.verdict(),
        }
    }
}

/// Full state of one match.
///
/// Broadcast whole over the realtime channel; receivers replace their copy
/// rather than replaying moves.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    pub board: Board,
    pub active_player: Player,
    pub verdict: Verdict,
    /// Set after a Dots-and-Boxes edge closes a box: the mover goes again.
    pub extra_turn_pending: bool,
}

impl MatchState {
    /// Fresh state, `Player::One` to move.
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            active_player: Player::One,
            verdict: Verdict::InProgress,
            extra_turn_pending: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> GameKind {
        self.board.kind()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.verdict.is_terminal()
    }
}

/// Rules trait.
///
/// ## Implementation Notes
///
/// - `apply_move` is pure: it returns the next state and leaves the input alone
/// - `apply_move` advances `active_player` unless the mover earned an extra
///   turn or the match ended
/// - `legal_moves` is empty once the match is decided
pub trait Rules {
    /// Game these rules govern.
    fn kind(&self) -> GameKind;

    /// State at the start of a match.
    fn initial_state(&self) -> MatchState;

    /// Moves `player` may make from `state`.
    fn legal_moves(&self, state: &MatchState, player: Player) -> Vec<MovePayload>;

    /// Validate and apply a move, returning the next state.
    fn apply_move(&self, state: &MatchState, mv: &Move) -> Result<MatchState, InvalidMove>;

    /// Current verdict.
    fn verdict(&self, state: &MatchState) -> Verdict;

    /// True if `state` has the shape these rules produce.
    fn accepts(&self, state: &MatchState) -> bool;
}

/// Standard rules for every game, dispatching on the board variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRules {
    kind: GameKind,
    dots: DotsGrid,
}

impl GameRules {
    #[must_use]
    pub const fn new(kind: GameKind) -> Self {
        Self {
            kind,
            dots: DotsGrid::new(4, 4),
        }
    }

    /// Dots-and-Boxes rules on a custom grid.
    #[must_use]
    pub const fn dots_and_boxes(dots: DotsGrid) -> Self {
        Self {
            kind: GameKind::DotsAndBoxes,
            dots,
        }
    }

    /// Rules for the configured game, once the config has been validated.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            kind: config.game,
            dots: config.dots,
        })
    }

    #[must_use]
    pub fn dots(&self) -> DotsGrid {
        self.dots
    }
}

impl Rules for GameRules {
    fn kind(&self) -> GameKind {
        self.kind
    }

    fn initial_state(&self) -> MatchState {
        MatchState::new(Board::new(self.kind, self.dots))
    }

    fn legal_moves(&self, state: &MatchState, player: Player) -> Vec<MovePayload> {
        if state.is_terminal() {
            return Vec::new();
        }

        state.board.legal_moves(player)
    }

    fn apply_move(&self, state: &MatchState, mv: &Move) -> Result<MatchState, InvalidMove> {
        if state.is_terminal() {
            return Err(InvalidMove::MatchOver);
        }

        let mut next = state.clone();
        let mut claimed = 0;
        let verdict = match (&mut next.board, mv.payload) {
            (Board::TicTacToe(b), MovePayload::Cell(cell)) => {
                if b.place(mv.player, cell)? {
                    Verdict::Win(mv.player)
                } else if b.is_full() {
                    Verdict::Draw
                } else {
                    Verdict::InProgress
                }
            }
            (Board::ConnectFour(b), MovePayload::Column(col)) => {
                if b.drop_disc(mv.player, col)?.wins {
                    Verdict::Win(mv.player)
                } else if b.is_full() {
                    Verdict::Draw
                } else {
                    Verdict::InProgress
                }
            }
            (Board::DotsAndBoxes(b), MovePayload::Edge(edge)) => {
                claimed = b.draw(mv.player, edge)?;
                b.verdict()
            }
            (Board::RockPaperScissors(b), MovePayload::Choice(choice)) => {
                b.commit(mv.player, choice)?;
                b.verdict()
            }
            _ => return Err(InvalidMove::WrongGame(self.kind)),
        };

        next.verdict = verdict;
        next.extra_turn_pending = claimed > 0 && !verdict.is_terminal();
        next.active_player = if verdict.is_terminal() || next.extra_turn_pending {
            mv.player
        } else {
            mv.player.opponent()
        };

        trace!(
            game = %self.kind,
            player = %mv.player,
            payload = ?mv.payload,
            ?verdict,
            extra_turn = next.extra_turn_pending,
            "applied move"
        );
        Ok(next)
    }

    fn verdict(&self, state: &MatchState) -> Verdict {
        state.board.verdict()
    }

    fn accepts(&self, state: &MatchState) -> bool {
        match &state.board {
            Board::ConnectFour(b) => self.kind == GameKind::ConnectFour && b.is_well_formed(),
            Board::DotsAndBoxes(b) => {
                self.kind == GameKind::DotsAndBoxes && b.grid() == self.dots && b.is_well_formed()
            }
            board => board.kind() == self.kind,
        }
    }
}
