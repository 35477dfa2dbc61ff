//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the rules, the session store, worker coordination and
//! action providers so clients can bubble them up with consistent context.

use combat_core::{ActionError, CombatError, CombatantId, ErrorSeverity, TurnError, UserId};
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("user {user} does not control {current}")]
    NotYourTurn { user: UserId, current: CombatantId },

    /// Another client wrote first. The local copy was reloaded and the local
    /// result dropped.
    #[error("session changed underneath this client (expected version {expected}, found {actual})")]
    StaleSession { expected: u64, actual: u64 },

    #[error("action provider failed: {0}")]
    Provider(String),

    #[error("runtime requires a session store before building")]
    MissingStore,

    #[error("sync worker command channel closed")]
    CommandChannelClosed,

    #[error("sync worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("sync worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    /// Classification reused from the rule errors where one applies.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(error) => error.severity(),
            Self::Turn(error) => error.severity(),
            Self::NotYourTurn { .. } | Self::StaleSession { .. } => ErrorSeverity::Recoverable,
            Self::SessionNotFound(_) | Self::MissingStore => ErrorSeverity::Validation,
            _ => ErrorSeverity::Internal,
        }
    }
}
