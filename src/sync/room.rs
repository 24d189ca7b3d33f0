//! Room codes and the per-peer view of a room.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{GameRng, Player};

pub const ROOM_CODE_LEN: usize = 10;
pub const ROOM_CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Identifier of a two-party channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Fresh code drawn from OS entropy.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut GameRng::from_entropy())
    }

    /// Fresh code drawn from `rng`.
    #[must_use]
    pub fn generate_with(rng: &mut GameRng) -> Self {
        let alphabet = ROOM_CODE_ALPHABET.as_bytes();
        let code = (0..ROOM_CODE_LEN)
            .map(|_| alphabet[rng.gen_range_usize(0..alphabet.len())] as char)
            .collect();
        Self(code)
    }

    /// Validate a user-typed code. Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Result<Self, RoomCodeError> {
        let value = value.trim();
        let found = value.chars().count();
        if found != ROOM_CODE_LEN {
            return Err(RoomCodeError::InvalidLength {
                expected: ROOM_CODE_LEN,
                found,
            });
        }
        if let Some((index, ch)) = value
            .chars()
            .enumerate()
            .find(|&(_, ch)| !ROOM_CODE_ALPHABET.contains(ch))
        {
            return Err(RoomCodeError::InvalidCharacter { ch, index });
        }
        Ok(Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    #[error("room code must be {expected} characters, got {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("invalid character '{ch}' at position {index}")]
    InvalidCharacter { ch: char, index: usize },
}

/// Which side of the room this peer is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Joiner,
}

impl Role {
    /// The seat this role plays. The host is always `Player::One`.
    #[must_use]
    pub const fn player(self) -> Player {
        match self {
            Role::Host => Player::One,
            Role::Joiner => Player::Two,
        }
    }

    #[must_use]
    pub const fn from_player(player: Player) -> Self {
        match player {
            Player::One => Role::Host,
            Player::Two => Role::Joiner,
        }
    }
}

/// One peer's view of a room. Lives only as long as its session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    pub local_role: Role,
    pub peer_count: u8,
    /// Highest sequence accepted from the other peer.
    pub last_seen_sequence: u64,
    /// Resets the host has issued so far.
    pub epoch: u64,
}

impl Room {
    #[must_use]
    pub fn new(code: RoomCode, local_role: Role) -> Self {
        Self {
            code,
            local_role,
            peer_count: 0,
            last_seen_sequence: 0,
            epoch: 0,
        }
    }

    #[must_use]
    pub const fn host_role(&self) -> Player {
        Role::Host.player()
    }

    #[must_use]
    pub const fn local_player(&self) -> Player {
        self.local_role.player()
    }

    #[must_use]
    pub const fn is_host(&self) -> bool {
        matches!(self.local_role, Role::Host)
    }

    /// Both peers are subscribed.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.peer_count >= 2
    }

    /// True if `sequence` is newer than anything accepted from the peer.
    #[must_use]
    pub const fn is_fresh(&self, sequence: u64) -> bool {
        sequence > self.last_seen_sequence
    }

    /// True if `epoch` comes from before the latest reset seen here.
    #[must_use]
    pub const fn is_outdated(&self, epoch: u64) -> bool {
        epoch < self.epoch
    }
}
