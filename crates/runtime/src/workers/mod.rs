//! Worker tasks that back the runtime orchestration.
//!
//! Each client runs one sync worker that owns its copy of the encounter.

mod sync;

pub use sync::Command;
pub(crate) use sync::{SessionSynchronizer, SyncWorker};
