//! Two-peer match sync over a publish/subscribe relay.
//!
//! - `room`: room codes and roles
//! - `message`, `codec`: what goes over the wire and how it is encoded
//! - `channel`: the relay abstraction and an in-process relay
//! - `protocol`: sequencing, host authority and the RPS reveal
//! - `driver`: the per-room tokio task

pub mod channel;
pub mod codec;
pub mod driver;
pub mod message;
pub mod protocol;
pub mod room;

pub use channel::{ChannelError, ChannelEvent, MemoryPublisher, MemoryRelay, Publisher, RealtimeChannel};
pub use codec::{codec_for, BincodeCodec, CodecError, JsonCodec, WireCodec};
pub use driver::{run_room, LocalInput, SessionEnd};
pub use message::SyncMessage;
pub use protocol::{InboundOutcome, SyncError, SyncSession};
pub use room::{Role, Room, RoomCode, RoomCodeError};
