//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use aura_core::AuraNotification;

use super::types::{CombatEvent, UnitEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Structural aura changes (applied, stacked, removed, ...)
    Aura,
    /// Resolved damage, heals, casts and visuals
    Combat,
    /// Spawns, deaths and clock steps
    Unit,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Aura, Topic::Combat, Topic::Unit];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Aura(AuraNotification),
    Combat(CombatEvent),
    Unit(UnitEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Aura(_) => Topic::Aura,
            Event::Combat(_) => Topic::Combat,
            Event::Unit(_) => Topic::Unit,
        }
    }
}

/// One broadcast sender per topic. The set of topics is fixed at construction.
struct Channels {
    aura: broadcast::Sender<Event>,
    combat: broadcast::Sender<Event>,
    unit: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Aura => &self.aura,
            Topic::Combat => &self.combat,
            Topic::Unit => &self.unit,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                aura: broadcast::channel(capacity).0,
                combat: broadcast::channel(capacity).0,
                unit: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::UnitId;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut units = bus.subscribe(Topic::Unit);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(Event::Unit(UnitEvent::Spawned { unit: UnitId(4) }));

        assert_eq!(
            units.recv().await.ok(),
            Some(Event::Unit(UnitEvent::Spawned { unit: UnitId(4) }))
        );
        assert!(matches!(
            combat.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::default();
        bus.publish(Event::Unit(UnitEvent::ClockAdvanced { now: 10 }));
    }
}
