//! Event bus for encounter observers.
//!
//! The encounter director publishes what happened during a tick; a HUD,
//! audio layer or log sink drains the bus at its own pace.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use duskfall_common::EntityId;

use crate::actor::DamageOutcome;
use crate::enemies::EnemyKind;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Enemy created and walking in
    EnemySpawned {
        /// Enemy ID
        enemy: EntityId,
        /// Enemy type
        kind: EnemyKind,
    },
    /// A hit landed on an enemy
    EnemyDamaged {
        /// Enemy ID
        enemy: EntityId,
        /// Damage amount
        damage: i32,
        /// How the enemy reacted
        outcome: DamageOutcome,
        /// Health after the hit
        health: i32,
    },
    /// Enemy health reached zero
    EnemyDied {
        /// Enemy ID
        enemy: EntityId,
        /// Enemy type
        kind: EnemyKind,
    },
    /// Death animation finished; the enemy left the live set
    EnemyRemoved {
        /// Enemy ID
        enemy: EntityId,
    },
    /// A hit landed on the player
    PlayerDamaged {
        /// Damage amount
        damage: i32,
        /// Health after the hit
        health: i32,
        /// Enemy that dealt it
        source: EntityId,
    },
    /// Player health reached zero
    PlayerDied,
    /// Coin picked up
    CoinCollected {
        /// Where it was collected
        at: Vec2,
        /// Score after pickup
        score: u32,
    },
    /// Boss defeated
    EncounterComplete {
        /// Boss type
        boss: EnemyKind,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
    /// Events lost to a full channel
    dropped: AtomicU64,
    /// Set by the first drop since the last drain
    overflowing: AtomicBool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            dropped: AtomicU64::new(0),
            overflowing: AtomicBool::new(false),
        }
    }

    /// Publishes an event. Returns false if the bus was full and the
    /// event was dropped.
    pub fn publish(&self, event: GameEvent) -> bool {
        let Err(err) = self.sender.try_send(event) else {
            return true;
        };
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if self.overflowing.swap(true, Ordering::Relaxed) {
            trace!("Event bus full, dropped {:?}", err.into_inner());
        } else {
            warn!(
                "Event bus full ({} pending), dropping until drained ({total} lost)",
                self.capacity
            );
        }
        false
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.overflowing.store(false, Ordering::Relaxed);
        self.receiver.try_iter().collect()
    }

    /// Events dropped because the bus was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }

    /// Creates a receiver handle for an observer on another thread.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain_in_order() {
        let bus = EventBus::new(4);
        let enemy = EntityId::from_raw(7);
        assert!(bus.publish(GameEvent::EnemySpawned {
            enemy,
            kind: EnemyKind::Skeleton,
        }));
        assert!(bus.publish(GameEvent::EnemyRemoved { enemy }));
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], GameEvent::EnemyRemoved { enemy });
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_and_counts_events() {
        let bus = EventBus::new(1);
        assert!(bus.publish(GameEvent::PlayerDied));
        assert!(!bus.publish(GameEvent::PlayerDied));
        assert!(!bus.publish(GameEvent::PlayerDied));
        assert_eq!(bus.dropped_count(), 2);
        assert_eq!(bus.drain().len(), 1);

        assert!(bus.publish(GameEvent::PlayerDied));
        assert_eq!(bus.dropped_count(), 2);
    }

    #[test]
    fn test_events_serialize() {
        let event = GameEvent::EncounterComplete {
            boss: EnemyKind::Knight,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("Knight"));
    }
}
