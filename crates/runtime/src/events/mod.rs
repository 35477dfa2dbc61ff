//! Topic-based event bus for synchronizer notifications.
//!
//! Presentation layers subscribe to the topics they render instead of
//! listening for ambient global events.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{BarrierEvent, SessionEvent, TurnEvent};
