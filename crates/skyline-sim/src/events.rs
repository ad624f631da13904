//! Event bus for simulation-to-collaborator communication.
//!
//! The simulation emits discrete events (hits, kills, waves) that
//! scoring, audio and effects layers consume; none of them feed back
//! into simulation state.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use skyline_common::EntityId;

use crate::attack::AttackKind;
use crate::input::Vec2;

/// Event types emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An attack connected with a target
    HitLanded {
        /// Attack that connected
        kind: AttackKind,
        /// World position of the impact
        position: Vec2,
        /// Combo count after this hit
        combo: u32,
    },
    /// An enemy was killed
    EnemyKilled {
        /// Enemy that died
        entity_id: EntityId,
        /// Attack that killed it
        kind: AttackKind,
        /// Score reward for the kill
        reward: u32,
        /// Where it died
        position: Vec2,
    },
    /// The player took damage
    PlayerDamaged {
        /// Damage applied
        damage: i32,
        /// Health remaining
        health: i32,
    },
    /// A wave's enemies were spawned
    WaveSpawned {
        /// Wave counter
        wave: u32,
        /// Number of enemies in the batch
        count: u32,
    },
    /// The last enemy of an active wave died
    WaveCleared {
        /// Wave counter that cleared
        wave: u32,
    },
    /// The combo meter crossed its milestone
    ComboMilestone {
        /// Count at the crossing
        count: u32,
    },
    /// The player jumped (audio hook)
    PlayerJumped,
    /// The player landed (audio hook)
    PlayerLanded,
    /// A web rope attached
    WebAttached {
        /// Anchor point of the new rope
        anchor: Vec2,
    },
    /// The web rope released
    WebReleased,
}

/// Bounded event bus; events beyond capacity are dropped rather
/// than blocking the tick.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Sends an event, dropping it if the bus is full.
    pub fn send(&self, event: SimEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of events the bus can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
