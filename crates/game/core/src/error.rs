//! Shared error classification.
//!
//! `ActionError`, `TurnError` and `BarrierError` live next to the operations
//! that raise them; each implements [`CombatError`] so callers can decide
//! whether to retry, log, or surface a failure without matching every variant.

/// How a caller should treat a failed combat operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// The same request can succeed once the session moves on
    /// (the actor's turn comes around, a cooldown clears, the barrier drops).
    Recoverable,
    /// The request names something that does not exist or is not allowed.
    Validation,
    /// Session data contradicts its own invariants.
    Internal,
}

impl ErrorSeverity {
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Implemented by every error `combat-core` returns.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable snake_case tag recorded on `action_failed` log entries.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_renders_as_snake_case() {
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "recoverable");
        assert_eq!(ErrorSeverity::Internal.as_ref(), "internal");
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_internal());
    }
}
