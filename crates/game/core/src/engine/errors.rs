//! Errors for encounter lifecycle operations.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{BarrierError, CombatState};

/// Errors that can occur while starting, sequencing or gating an encounter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("combat has already ended")]
    CombatEnded,

    #[error("expected combat state {expected}, found {actual}")]
    InvalidState {
        expected: CombatState,
        actual: CombatState,
    },

    #[error("cannot start combat without combatants")]
    EmptyRoster,

    #[error(transparent)]
    Barrier(#[from] BarrierError),
}

impl TurnError {
    pub(crate) fn expect_state(actual: CombatState, expected: CombatState) -> Result<(), Self> {
        match actual {
            CombatState::Ended => Err(Self::CombatEnded),
            actual if actual == expected => Ok(()),
            actual => Err(Self::InvalidState { expected, actual }),
        }
    }
}

impl CombatError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CombatEnded | Self::InvalidState { .. } => ErrorSeverity::Recoverable,
            Self::EmptyRoster => ErrorSeverity::Validation,
            Self::Barrier(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CombatEnded => "TURN_COMBAT_ENDED",
            Self::InvalidState { .. } => "TURN_INVALID_STATE",
            Self::EmptyRoster => "TURN_EMPTY_ROSTER",
            Self::Barrier(error) => error.error_code(),
        }
    }
}
