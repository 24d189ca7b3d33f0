//! Host-authoritative match sync.
//!
//! Either peer may move: it applies the move locally, then publishes the
//! whole resulting state tagged with a sequence number. A receiver keeps
//! only updates newer than anything it has accepted from that peer.
//!
//! The host alone may reset the match and commit the score. Its score rides
//! along on every state it broadcasts and the joiner mirrors it.
//!
//! Rock-Paper-Scissors is the one game where a state cannot be shown as
//! soon as it arrives. Each side publishes only its own slot; a peer's
//! commit is held sealed here until the host, holding both choices,
//! publishes the merged reveal.
//!
//! A host reset starts a new epoch. Whatever the peer sent during an earlier
//! epoch is stale on arrival, and a decided board stays frozen until the
//! next epoch begins.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use super::channel::{ChannelError, ChannelEvent, Publisher, RealtimeChannel};
use super::codec::{codec_for, CodecError, WireCodec};
use super::message::SyncMessage;
use super::room::{Role, Room, RoomCode};
use crate::core::{Choice, ConfigError, Move, MovePayload, Player, SessionConfig};
use crate::rules::{Board, GameRules, MatchState, Rules};
use crate::session::{Mode, Notice, Phase, Score, SessionCoordinator, SessionError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What became of one inbound payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InboundOutcome {
    /// Applied to the local coordinator.
    Accepted,
    /// Not newer than the last update accepted from the peer, or sent
    /// before the latest reset. Dropped.
    Stale,
    /// Undecodable, misaddressed, an echo, not allowed from its sender, or
    /// an attempt to reopen a decided board.
    Ignored,
    /// A peer's Rock-Paper-Scissors choice, held back until the reveal.
    Sealed,
    /// Both Rock-Paper-Scissors choices are now visible on this side.
    Revealed,
}

/// One peer's end of a networked match.
pub struct SyncSession<P, R: Rules = GameRules> {
    room: Room,
    coordinator: SessionCoordinator<R>,
    publisher: P,
    codec: Box<dyn WireCodec>,
    /// Peer's committed choice not yet disclosed locally.
    sealed: Option<Choice>,
    peer_wait_timeout: Option<Duration>,
}

impl<P: Publisher> SyncSession<P, GameRules> {
    /// Open a new room under a fresh code and wait for a joiner.
    pub fn host<C>(
        channel: &C,
        config: &SessionConfig,
    ) -> Result<(Self, UnboundedReceiver<ChannelEvent>), SyncError>
    where
        C: RealtimeChannel<Publisher = P>,
    {
        Self::from_config(channel, RoomCode::generate(), Role::Host, config)
    }

    /// Join the room behind `code`.
    pub fn join<C>(
        channel: &C,
        code: RoomCode,
        config: &SessionConfig,
    ) -> Result<(Self, UnboundedReceiver<ChannelEvent>), SyncError>
    where
        C: RealtimeChannel<Publisher = P>,
    {
        Self::from_config(channel, code, Role::Joiner, config)
    }

    fn from_config<C>(
        channel: &C,
        code: RoomCode,
        role: Role,
        config: &SessionConfig,
    ) -> Result<(Self, UnboundedReceiver<ChannelEvent>), SyncError>
    where
        C: RealtimeChannel<Publisher = P>,
    {
        let coordinator = SessionCoordinator::from_config(config)?;
        let (session, events) = Self::open(channel, code, role, coordinator, codec_for(config.wire_format))?;
        Ok((session.with_peer_wait_timeout(config.peer_wait_timeout()), events))
    }
}

impl<P: Publisher, R: Rules> SyncSession<P, R> {
    /// Subscribe to `code` and start a networked match on `coordinator`.
    pub fn open<C>(
        channel: &C,
        code: RoomCode,
        role: Role,
        mut coordinator: SessionCoordinator<R>,
        codec: Box<dyn WireCodec>,
    ) -> Result<(Self, UnboundedReceiver<ChannelEvent>), SyncError>
    where
        C: RealtimeChannel<Publisher = P>,
    {
        coordinator.select_mode(Mode::Networked {
            local_role: role.player(),
        })?;
        let (publisher, events) = channel.subscribe(&code)?;
        info!(room = %code, ?role, "subscribed");

        let session = Self {
            room: Room::new(code, role),
            coordinator,
            publisher,
            codec,
            sealed: None,
            peer_wait_timeout: None,
        };
        Ok((session, events))
    }

    #[must_use]
    pub fn with_peer_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.peer_wait_timeout = timeout;
        self
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn coordinator(&self) -> &SessionCoordinator<R> {
        &self.coordinator
    }

    pub fn peer_wait_timeout(&self) -> Option<Duration> {
        self.peer_wait_timeout
    }

    /// True while a peer's Rock-Paper-Scissors choice is held back.
    pub fn has_sealed_choice(&self) -> bool {
        self.sealed.is_some()
    }

    /// Play a move for the local seat and publish the result.
    pub fn submit_local(&mut self, payload: MovePayload) -> Result<Move, SyncError> {
        let mv = self.coordinator.submit_move(self.room.local_player(), payload)?;

        if self.is_rps() && self.room.is_host() {
            if let Some(choice) = self.sealed.take() {
                if self.reveal(choice)? == InboundOutcome::Revealed {
                    return Ok(mv);
                }
            }
        }

        let state = self.outgoing_state();
        self.publish_state(mv.sequence, state)?;
        Ok(mv)
    }

    /// Start the match over. Only the host may.
    pub fn reset(&mut self) -> Result<(), SyncError> {
        let sequence = self.coordinator.reset()?;
        self.sealed = None;
        self.room.epoch += 1;
        let message = SyncMessage::Reset {
            room: self.room.code.clone(),
            sender: self.room.local_player(),
            sequence,
            epoch: self.room.epoch,
        };
        self.publish(&message)
    }

    /// React to a change in the number of subscribed peers.
    pub fn on_peer_count(&mut self, count: u8) {
        self.room.peer_count = count;
        debug!(room = %self.room.code, count, "peers");
        self.coordinator.set_peer_present(self.room.is_full());
    }

    /// Decode and apply one inbound payload.
    pub fn on_message(&mut self, payload: &[u8]) -> Result<InboundOutcome, SyncError> {
        let message = match self.codec.decode(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(room = %self.room.code, %err, "dropping undecodable payload");
                return Ok(InboundOutcome::Ignored);
            }
        };

        if message.room() != &self.room.code || message.sender() == self.room.local_player() {
            return Ok(InboundOutcome::Ignored);
        }
        let (sequence, epoch) = (message.sequence(), message.epoch());
        if self.room.is_host() && epoch > self.room.epoch {
            debug!(room = %self.room.code, epoch, "epoch ahead of the host ignored");
            return Ok(InboundOutcome::Ignored);
        }
        if self.room.is_outdated(epoch) {
            debug!(room = %self.room.code, epoch, current = self.room.epoch, "pre-reset update dropped");
            return Ok(InboundOutcome::Stale);
        }
        if !self.room.is_fresh(sequence) {
            debug!(
                room = %self.room.code,
                sequence,
                last_seen = self.room.last_seen_sequence,
                "stale update dropped"
            );
            return Ok(InboundOutcome::Stale);
        }

        match message {
            SyncMessage::Reset { sender, .. } => Ok(self.on_remote_reset(sender, sequence, epoch)),
            SyncMessage::State { state, score, .. } => self.on_remote_state(state, score, sequence, epoch),
        }
    }

    /// Unsubscribe from the room.
    pub fn leave(&mut self) -> Result<(), SyncError> {
        info!(room = %self.room.code, "leaving room");
        self.publisher.leave(&self.room.code)?;
        Ok(())
    }

    fn on_remote_reset(&mut self, sender: Player, sequence: u64, epoch: u64) -> InboundOutcome {
        if self.room.is_host() || sender != self.room.host_role() {
            debug!(room = %self.room.code, %sender, "reset from non-host ignored");
            return InboundOutcome::Ignored;
        }
        self.room.last_seen_sequence = sequence;
        self.enter_epoch(epoch, sequence);
        InboundOutcome::Accepted
    }

    /// Joiner only: the host has reset, whether or not its `Reset` arrived
    /// first.
    fn enter_epoch(&mut self, epoch: u64, sequence: u64) {
        self.room.epoch = self.room.epoch.max(epoch);
        self.sealed = None;
        self.coordinator.apply_remote_reset(sequence);
    }

    fn on_remote_state(
        &mut self,
        state: MatchState,
        score: Option<Score>,
        sequence: u64,
        epoch: u64,
    ) -> Result<InboundOutcome, SyncError> {
        if !self.coordinator.rules().accepts(&state) {
            warn!(room = %self.room.code, sequence, "state for the wrong game ignored");
            return Ok(InboundOutcome::Ignored);
        }

        // Only a joiner gets this far with a newer epoch: the host reset.
        if epoch > self.room.epoch {
            self.enter_epoch(epoch, sequence);
        } else if self.coordinator.phase() == Phase::Terminal && !state.is_terminal() {
            debug!(room = %self.room.code, sequence, "decided board stays frozen");
            return Ok(InboundOutcome::Ignored);
        }

        let peer = self.room.local_player().opponent();
        let rps = match &state.board {
            Board::RockPaperScissors(slots) => Some((slots.both_committed(), slots.choice(peer))),
            _ => None,
        };
        if let Some((both, peer_choice)) = rps {
            return match (self.room.is_host(), both, peer_choice) {
                // The joiner never learns its opponent's choice ahead of the reveal.
                (false, true, _) => {
                    self.accept(state, score, sequence);
                    self.sealed = None;
                    self.coordinator.notify(Notice::RoundRevealed);
                    Ok(InboundOutcome::Revealed)
                }
                (true, true, _) | (_, false, None) => Ok(InboundOutcome::Ignored),
                (is_host, false, Some(choice)) => {
                    self.room.last_seen_sequence = sequence;
                    self.coordinator.observe_sequence(sequence);
                    if is_host && self.local_choice().is_some() {
                        self.reveal(choice)
                    } else {
                        self.sealed = Some(choice);
                        debug!(room = %self.room.code, sequence, "peer choice sealed");
                        Ok(InboundOutcome::Sealed)
                    }
                }
            };
        }

        let score_before = *self.coordinator.score();
        self.accept(state, score, sequence);

        // A verdict the host just scored has to reach the joiner.
        if self.room.is_host() && *self.coordinator.score() != score_before {
            let next = self.coordinator.sequence() + 1;
            self.coordinator.observe_sequence(next);
            let state = self.outgoing_state();
            self.publish_state(next, state)?;
        }
        Ok(InboundOutcome::Accepted)
    }

    fn accept(&mut self, state: MatchState, score: Option<Score>, sequence: u64) {
        self.room.last_seen_sequence = sequence;
        if !self.room.is_host() {
            if let Some(score) = score {
                self.coordinator.mirror_score(score);
            }
        }
        self.coordinator.adopt_remote(state, sequence);
    }

    /// Host only: merge the peer's choice, disclose and publish the reveal.
    fn reveal(&mut self, peer_choice: Choice) -> Result<InboundOutcome, SyncError> {
        let peer = self.room.local_player().opponent();
        let sequence = self.coordinator.sequence() + 1;
        let mv = Move::new(peer, MovePayload::Choice(peer_choice), sequence);
        let merged = match self.coordinator.rules().apply_move(self.coordinator.state(), &mv) {
            Ok(merged) => merged,
            Err(err) => {
                warn!(room = %self.room.code, %err, "cannot merge peer choice");
                return Ok(InboundOutcome::Ignored);
            }
        };

        self.coordinator.adopt_remote(merged.clone(), sequence);
        self.coordinator.notify(Notice::RoundRevealed);
        info!(room = %self.room.code, sequence, verdict = ?merged.verdict, "round revealed");
        self.publish_state(sequence, merged)?;
        Ok(InboundOutcome::Revealed)
    }

    fn is_rps(&self) -> bool {
        matches!(self.coordinator.state().board, Board::RockPaperScissors(_))
    }

    fn local_choice(&self) -> Option<Choice> {
        match &self.coordinator.state().board {
            Board::RockPaperScissors(slots) => slots.choice(self.room.local_player()),
            _ => None,
        }
    }

    /// Local state as the peer may see it: only this side's RPS slot.
    fn outgoing_state(&self) -> MatchState {
        let mut state = self.coordinator.state().clone();
        let hidden = match &state.board {
            Board::RockPaperScissors(slots) if !slots.both_committed() => {
                Some(slots.only(self.room.local_player()))
            }
            _ => None,
        };
        if let Some(slots) = hidden {
            state.board = Board::RockPaperScissors(slots);
        }
        state
    }

    fn publish_state(&mut self, sequence: u64, state: MatchState) -> Result<(), SyncError> {
        let score = self.room.is_host().then(|| *self.coordinator.score());
        let message = SyncMessage::State {
            room: self.room.code.clone(),
            sender: self.room.local_player(),
            sequence,
            epoch: self.room.epoch,
            state,
            score,
        };
        self.publish(&message)
    }

    fn publish(&mut self, message: &SyncMessage) -> Result<(), SyncError> {
        let payload = self.codec.encode(message)?;
        self.publisher.publish(&self.room.code, payload)?;
        debug!(room = %self.room.code, sequence = message.sequence(), "published");
        Ok(())
    }
}
