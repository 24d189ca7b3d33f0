use serde::{Deserialize, Serialize};

use super::room::RoomCode;
use crate::core::Player;
use crate::rules::MatchState;
use crate::session::Score;

/// Everything that travels over a room's channel.
///
/// State sync, not move sync: every update carries the whole post-move
/// state so a receiver never has to replay moves. `epoch` counts the host's
/// resets, so traffic from before a reset can be told apart from traffic
/// after it whatever its sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMessage {
    State {
        room: RoomCode,
        sender: Player,
        sequence: u64,
        epoch: u64,
        state: MatchState,
        /// The host's score, included on every host broadcast.
        score: Option<Score>,
    },
    /// Host-only: start the match over.
    Reset {
        room: RoomCode,
        sender: Player,
        sequence: u64,
        epoch: u64,
    },
}

impl SyncMessage {
    #[must_use]
    pub fn room(&self) -> &RoomCode {
        match self {
            SyncMessage::State { room, .. } | SyncMessage::Reset { room, .. } => room,
        }
    }

    #[must_use]
    pub fn sender(&self) -> Player {
        match self {
            SyncMessage::State { sender, .. } | SyncMessage::Reset { sender, .. } => *sender,
        }
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        match self {
            SyncMessage::State { sequence, .. } | SyncMessage::Reset { sequence, .. } => *sequence,
        }
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            SyncMessage::State { epoch, .. } | SyncMessage::Reset { epoch, .. } => *epoch,
        }
    }
}
