//! One task per room: feed channel events and local input into a
//! `SyncSession` until the user leaves or the channel goes away.

use std::future;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::channel::{ChannelEvent, Publisher};
use super::protocol::SyncSession;
use crate::core::MovePayload;
use crate::rules::Rules;

/// Something the local user did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalInput {
    Move(MovePayload),
    Reset,
    Leave,
}

/// Why a room task stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionEnd {
    /// The user left, or the input side hung up.
    Left,
    /// The relay closed the subscription.
    ChannelClosed,
    /// The opponent did not show up within the configured wait.
    TimedOut,
}

/// Drive `session` until it ends.
///
/// Rejected local input is logged and the loop carries on; the coordinator
/// has already told the presentation layer. While fewer than two peers are
/// present and the session has a peer wait timeout, the task gives up once
/// it elapses.
pub async fn run_room<P, R>(
    session: &mut SyncSession<P, R>,
    events: &mut UnboundedReceiver<ChannelEvent>,
    inputs: &mut UnboundedReceiver<LocalInput>,
) -> SessionEnd
where
    P: Publisher,
    R: Rules,
{
    let timeout = session.peer_wait_timeout();
    let mut deadline = waiting_deadline(session.room().is_full(), timeout, None);

    let end = loop {
        let expiry = async move {
            match deadline {
                Some(at) => time::sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            event = events.recv() => match event {
                Some(ChannelEvent::Message(payload)) => match session.on_message(&payload) {
                    Ok(outcome) => debug!(?outcome, "inbound"),
                    Err(err) => warn!(%err, "inbound message failed"),
                },
                Some(ChannelEvent::PeerCount(count)) => {
                    session.on_peer_count(count);
                    deadline = waiting_deadline(session.room().is_full(), timeout, deadline);
                }
                None => break SessionEnd::ChannelClosed,
            },
            input = inputs.recv() => match input {
                Some(LocalInput::Move(payload)) => {
                    if let Err(err) = session.submit_local(payload) {
                        debug!(%err, "local move rejected");
                    }
                }
                Some(LocalInput::Reset) => {
                    if let Err(err) = session.reset() {
                        debug!(%err, "local reset rejected");
                    }
                }
                Some(LocalInput::Leave) | None => break SessionEnd::Left,
            },
            () = expiry => break SessionEnd::TimedOut,
        }
    };

    if end != SessionEnd::ChannelClosed {
        if let Err(err) = session.leave() {
            warn!(%err, "leaving room failed");
        }
    }
    info!(room = %session.room().code, ?end, "room task finished");
    end
}

/// Keep a running deadline while waiting, start one when the wait begins,
/// and drop it once the room is full.
fn waiting_deadline(
    full: bool,
    timeout: Option<std::time::Duration>,
    current: Option<Instant>,
) -> Option<Instant> {
    if full {
        return None;
    }
    current.or_else(|| timeout.map(|t| Instant::now() + t))
}
