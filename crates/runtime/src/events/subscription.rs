use tokio::sync::broadcast::{self, error::RecvError};

use super::types::EventEnvelope;
use crate::types::{BattleId, Viewer};

/// Read-only event feed for one viewer of one battle.
#[derive(Debug)]
pub struct Subscription {
    battle_id: BattleId,
    viewer: Viewer,
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl Subscription {
    pub(crate) fn new(
        battle_id: BattleId,
        viewer: Viewer,
        receiver: broadcast::Receiver<EventEnvelope>,
    ) -> Self {
        Self {
            battle_id,
            viewer,
            receiver,
        }
    }

    pub fn battle_id(&self) -> BattleId {
        self.battle_id
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Next event, or `None` once the battle has ended and the feed is drained.
    ///
    /// A slow reader that falls behind the buffer skips the overwritten events
    /// and keeps going; the gap is visible in the sequence numbers.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        target: "runtime::events",
                        battle = %self.battle_id,
                        viewer = %self.viewer,
                        skipped,
                        "subscriber lagged behind"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Unsubscribes.
    pub fn close(self) {}
}
