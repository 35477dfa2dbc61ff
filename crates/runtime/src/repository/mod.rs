//! Session store layer.
//!
//! The store holds the shared encounter document every client reads and
//! writes. Writes are field-level patches guarded by the document version, and
//! each successful write is pushed to every subscriber.
//!
//! Rules never live here: the store only persists what `combat-core` decided.

mod error;
mod memory;
mod patch;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::InMemorySessionStore;
pub use patch::{LogPatch, SessionPatch};
pub use traits::{SessionStore, SessionSubscription};
