//! Realtime publish/subscribe channel keyed by room code.
//!
//! The channel is a relay only: it fans payloads out and reports how many
//! peers are subscribed. It knows nothing about games.

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use super::room::RoomCode;

/// Most peers a room admits.
pub const ROOM_CAPACITY: usize = 2;

/// What a subscriber hears from its room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    Message(Vec<u8>),
    PeerCount(u8),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("room {0} already has two peers")]
    RoomFull(RoomCode),

    #[error("not subscribed to room {0}")]
    NotSubscribed(RoomCode),

    #[error("relay is unavailable")]
    Unavailable,
}

/// Sending half of a subscription.
pub trait Publisher: Send {
    fn publish(&self, room: &RoomCode, payload: Vec<u8>) -> Result<(), ChannelError>;

    fn leave(&self, room: &RoomCode) -> Result<(), ChannelError>;
}

/// A relay peers can subscribe to.
pub trait RealtimeChannel {
    type Publisher: Publisher;

    fn subscribe(
        &self,
        room: &RoomCode,
    ) -> Result<(Self::Publisher, UnboundedReceiver<ChannelEvent>), ChannelError>;
}

#[derive(Debug)]
struct Subscriber {
    id: u64,
    tx: UnboundedSender<ChannelEvent>,
}

#[derive(Debug, Default)]
struct RelayInner {
    next_id: u64,
    rooms: FxHashMap<RoomCode, Vec<Subscriber>>,
}

impl RelayInner {
    fn broadcast_count(&mut self, room: &RoomCode) {
        let Some(subscribers) = self.rooms.get_mut(room) else {
            return;
        };
        subscribers.retain(|s| !s.tx.is_closed());
        let count = subscribers.len() as u8;
        for subscriber in subscribers.iter() {
            // A receiver dropped since the retain is pruned next time.
            let _ = subscriber.tx.send(ChannelEvent::PeerCount(count));
        }
        debug!(%room, count, "peer count");
        if subscribers.is_empty() {
            self.rooms.remove(room);
        }
    }
}

/// In-process relay. Cloning shares the same rooms.
#[derive(Clone, Debug, Default)]
pub struct MemoryRelay {
    inner: Arc<Mutex<RelayInner>>,
}

impl MemoryRelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peers currently subscribed to `room`.
    #[must_use]
    pub fn peer_count(&self, room: &RoomCode) -> usize {
        self.lock()
            .map(|inner| inner.rooms.get(room).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelayInner>, ChannelError> {
        self.inner.lock().map_err(|_| ChannelError::Unavailable)
    }
}

impl RealtimeChannel for MemoryRelay {
    type Publisher = MemoryPublisher;

    fn subscribe(
        &self,
        room: &RoomCode,
    ) -> Result<(MemoryPublisher, UnboundedReceiver<ChannelEvent>), ChannelError> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let subscribers = inner.rooms.entry(room.clone()).or_default();
        subscribers.retain(|s| !s.tx.is_closed());
        if subscribers.len() >= ROOM_CAPACITY {
            return Err(ChannelError::RoomFull(room.clone()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        subscribers.push(Subscriber { id, tx });
        inner.broadcast_count(room);

        let publisher = MemoryPublisher {
            relay: self.clone(),
            id,
        };
        Ok((publisher, rx))
    }
}

/// Handle returned by `MemoryRelay::subscribe`.
#[derive(Debug)]
pub struct MemoryPublisher {
    relay: MemoryRelay,
    id: u64,
}

impl Publisher for MemoryPublisher {
    fn publish(&self, room: &RoomCode, payload: Vec<u8>) -> Result<(), ChannelError> {
        let inner = self.relay.lock()?;
        let subscribers = inner
            .rooms
            .get(room)
            .filter(|subs| subs.iter().any(|s| s.id == self.id))
            .ok_or_else(|| ChannelError::NotSubscribed(room.clone()))?;

        for subscriber in subscribers.iter().filter(|s| s.id != self.id) {
            let _ = subscriber.tx.send(ChannelEvent::Message(payload.clone()));
        }
        trace!(%room, bytes = payload.len(), "relayed payload");
        Ok(())
    }

    fn leave(&self, room: &RoomCode) -> Result<(), ChannelError> {
        let mut inner = self.relay.lock()?;
        let subscribers = inner
            .rooms
            .get_mut(room)
            .ok_or_else(|| ChannelError::NotSubscribed(room.clone()))?;
        let before = subscribers.len();
        subscribers.retain(|s| s.id != self.id);
        if subscribers.len() == before {
            return Err(ChannelError::NotSubscribed(room.clone()));
        }
        inner.broadcast_count(room);
        Ok(())
    }
}
