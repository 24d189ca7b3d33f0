use thiserror::Error;

use super::GameKind;
use crate::core::{EdgeLocator, MovePayload, Player};

/// A move the rules refuse. State is never mutated when this is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("cell {0} is already occupied")]
    Occupied(u8),

    #[error("{0:?} is off the board")]
    OutOfRange(MovePayload),

    #[error("column {0} is full")]
    ColumnFull(u8),

    #[error("edge {0} is already drawn")]
    EdgeTaken(EdgeLocator),

    #[error("{0} has already chosen")]
    ChoiceLocked(Player),

    #[error("the match is already decided")]
    MatchOver,

    #[error("move does not belong to {0}")]
    WrongGame(GameKind),
}
