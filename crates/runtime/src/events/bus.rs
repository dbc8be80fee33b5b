//! Broadcast channel owned by one battle session.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use super::subscription::Subscription;
use super::types::EventEnvelope;
use crate::types::{BattleId, Viewer};

/// Single-topic event bus for one battle.
///
/// Cloning shares the underlying channel. Once [`EventBus::close`] runs, new
/// subscriptions are refused and existing receivers see end-of-stream after
/// draining what is already buffered.
#[derive(Clone, Debug)]
pub struct EventBus {
    battle_id: BattleId,
    sender: Arc<RwLock<Option<broadcast::Sender<EventEnvelope>>>>,
}

impl EventBus {
    pub fn new(battle_id: BattleId, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            battle_id,
            sender: Arc::new(RwLock::new(Some(sender))),
        }
    }

    /// Delivers `envelope` to every current subscriber.
    ///
    /// Returns how many receivers got it. Publishing with nobody listening, or
    /// after close, is not an error.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        let Ok(sender) = self.sender.read() else {
            tracing::warn!(target: "runtime::events", battle = %self.battle_id, "event bus lock poisoned");
            return 0;
        };
        match sender.as_ref() {
            Some(tx) => tx.send(envelope).unwrap_or_else(|_| {
                tracing::trace!(target: "runtime::events", battle = %self.battle_id, "no subscribers");
                0
            }),
            None => 0,
        }
    }

    /// Opens a read-only feed, or `None` if the battle is over.
    pub fn subscribe(&self, viewer: Viewer) -> Option<Subscription> {
        let sender = self.sender.read().ok()?;
        let receiver = sender.as_ref()?.subscribe();
        Some(Subscription::new(self.battle_id, viewer, receiver))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .ok()
            .and_then(|sender| sender.as_ref().map(broadcast::Sender::receiver_count))
            .unwrap_or(0)
    }

    /// Drops the sender so subscribers observe end-of-stream.
    pub fn close(&self) {
        match self.sender.write() {
            Ok(mut sender) => {
                sender.take();
            }
            Err(poisoned) => {
                poisoned.into_inner().take();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().map(|sender| sender.is_none()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleEvent, Point, TroopId, TroopMove};

    fn envelope(sequence: u64) -> EventEnvelope {
        EventEnvelope {
            battle_id: BattleId(1),
            sequence,
            timestamp_ms: sequence * 100,
            event: BattleEvent::TroopMove(TroopMove {
                troop_id: TroopId(0),
                to: Point::new(1.0, 1.0),
            }),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let bus = EventBus::new(BattleId(1), 16);
        let mut attacker = bus.subscribe(Viewer::Attacker).unwrap();
        let mut spectator = bus.subscribe(Viewer::Spectator(9)).unwrap();

        assert_eq!(bus.publish(envelope(0)), 2);
        assert_eq!(bus.publish(envelope(1)), 2);

        for subscription in [&mut attacker, &mut spectator] {
            assert_eq!(subscription.recv().await.unwrap().sequence, 0);
            assert_eq!(subscription.recv().await.unwrap().sequence, 1);
        }
    }

    #[tokio::test]
    async fn close_ends_streams_after_buffered_events() {
        let bus = EventBus::new(BattleId(1), 16);
        let mut subscription = bus.subscribe(Viewer::Attacker).unwrap();
        bus.publish(envelope(0));
        bus.close();

        assert_eq!(subscription.recv().await.unwrap().sequence, 0);
        assert!(subscription.recv().await.is_none());
        assert!(bus.is_closed());
        assert!(bus.subscribe(Viewer::Spectator(1)).is_none());
        assert_eq!(bus.publish(envelope(1)), 0);
    }

    #[tokio::test]
    async fn closed_subscription_stops_counting() {
        let bus = EventBus::new(BattleId(1), 16);
        let subscription = bus.subscribe(Viewer::Spectator(3)).unwrap();
        assert_eq!(bus.subscriber_count(), 1);
        subscription.close();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(envelope(0)), 0);
    }
}
