// ═══════════════════════════════════════════════════════════════════════
// Broadcast seam — the push transport reduced to its interface.
// ═══════════════════════════════════════════════════════════════════════

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use war_engine::{MatchId, MatchSnapshot};

#[derive(Debug, Clone)]
pub enum PushEvent {
    /// Lobby membership changed.
    LobbyUpdated(MatchId, MatchSnapshot),
    /// Match state mutated by a committed action.
    MatchUpdated(MatchId, MatchSnapshot),
}

pub trait Broadcaster: Send + Sync {
    fn publish(&self, event: PushEvent);
}

/// Drops every event. For simulations and tests that don't observe pushes.
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn publish(&self, _event: PushEvent) {}
}

/// Forwards events into an mpsc channel for an out-of-process transport
/// (or a test) to drain.
pub struct ChannelBroadcaster {
    tx: Mutex<Sender<PushEvent>>,
}

impl ChannelBroadcaster {
    pub fn new() -> (Self, Receiver<PushEvent>) {
        let (tx, rx) = channel();
        (
            ChannelBroadcaster { tx: Mutex::new(tx) },
            rx,
        )
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, event: PushEvent) {
        if let Ok(tx) = self.tx.lock() {
            // A disconnected receiver just means nobody is listening.
            let _ = tx.send(event);
        }
    }
}
