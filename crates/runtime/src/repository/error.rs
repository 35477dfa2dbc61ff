//! Error types raised by session store implementations.

use thiserror::Error;

/// Errors surfaced by session store implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("session store lock was poisoned")]
    LockPoisoned,

    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} already exists")]
    AlreadyExists(String),

    /// The writer's copy is older than the stored document.
    #[error("stale write to session {session_id}: expected version {expected}, stored {actual}")]
    StaleWrite {
        session_id: String,
        expected: u64,
        actual: u64,
    },

    /// Ended sessions accept no further writes.
    #[error("session {0} has ended")]
    SessionEnded(String),

    #[error("session store closed")]
    Closed,
}

impl RepositoryError {
    pub fn is_stale_write(&self) -> bool {
        matches!(self, Self::StaleWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
