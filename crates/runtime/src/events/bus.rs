//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{BarrierEvent, SessionEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Session document changes (sync, actions, conflicts, end)
    Session,
    /// Turn handoffs
    Turn,
    /// Readiness barrier transitions
    Barrier,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Session(SessionEvent),
    Turn(TurnEvent),
    Barrier(BarrierEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Session(_) => Topic::Session,
            Event::Turn(_) => Topic::Turn,
            Event::Barrier(_) => Topic::Barrier,
        }
    }
}

impl From<SessionEvent> for Event {
    fn from(event: SessionEvent) -> Self {
        Event::Session(event)
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<BarrierEvent> for Event {
    fn from(event: BarrierEvent) -> Self {
        Event::Barrier(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Clones share the same channels.
#[derive(Clone)]
pub struct EventBus {
    session: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    barrier: broadcast::Sender<Event>,
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
            session: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
            barrier: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Session => &self.session,
            Topic::Turn => &self.turn,
            Topic::Barrier => &self.barrier,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
