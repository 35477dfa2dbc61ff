//! Action resolution errors.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{CombatState, CombatantId};

use super::ActionKind;

/// Reasons an action request is rejected.
///
/// A rejected request never mutates the session or advances the turn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("combat has already ended")]
    CombatEnded,

    #[error("combat is not active (state: {0})")]
    CombatNotActive(CombatState),

    #[error("waiting for the party to acknowledge the last enemy turn")]
    ReadinessPending,

    #[error("actor {0} not found")]
    ActorNotFound(CombatantId),

    #[error("it is not {actor}'s turn")]
    NotActorsTurn {
        actor: CombatantId,
        current: Option<CombatantId>,
    },

    #[error("actor {0} is down")]
    ActorDead(CombatantId),

    #[error("{kind} is on cooldown for {remaining} more turn(s)")]
    OnCooldown { kind: ActionKind, remaining: u32 },

    #[error("{0} is not available to this combatant")]
    ActionNotAvailable(ActionKind),

    #[error("{0} requires a target")]
    TargetRequired(ActionKind),

    #[error("target {0} not found")]
    TargetNotFound(CombatantId),

    #[error("{target} is not a legal target for {kind}")]
    InvalidTarget {
        kind: ActionKind,
        target: CombatantId,
    },

    #[error("session invariant violated: {0}")]
    Inconsistent(String),
}

impl CombatError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            CombatEnded | CombatNotActive(_) | ReadinessPending => ErrorSeverity::Recoverable,
            NotActorsTurn { .. } | OnCooldown { .. } => ErrorSeverity::Recoverable,
            ActorNotFound(_) | ActorDead(_) | ActionNotAvailable(_) => ErrorSeverity::Validation,
            TargetRequired(_) | TargetNotFound(_) | InvalidTarget { .. } => {
                ErrorSeverity::Validation
            }
            Inconsistent(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            CombatEnded => "ACTION_COMBAT_ENDED",
            CombatNotActive(_) => "ACTION_COMBAT_NOT_ACTIVE",
            ReadinessPending => "ACTION_READINESS_PENDING",
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            NotActorsTurn { .. } => "ACTION_NOT_ACTORS_TURN",
            ActorDead(_) => "ACTION_ACTOR_DEAD",
            OnCooldown { .. } => "ACTION_ON_COOLDOWN",
            ActionNotAvailable(_) => "ACTION_NOT_AVAILABLE",
            TargetRequired(_) => "ACTION_TARGET_REQUIRED",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            Inconsistent(_) => "ACTION_INCONSISTENT",
        }
    }
}
