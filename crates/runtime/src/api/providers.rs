//! Asynchronous abstraction for sourcing combatant intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so enemy turns
//! (and, on autopilot, the local user's turns) can be driven by the built-in
//! policies, scripted fixtures, or an external decision service.
use async_trait::async_trait;
use combat_core::{ActionRequest, CombatSession, CombatantId};

use super::errors::Result;

/// Trait for choosing an action for the combatant whose turn it is.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide an action for `actor` based on the current session.
    ///
    /// # Returns
    /// The request to resolve, `None` to pass the turn, or an error if no
    /// decision could be made.
    async fn provide_action(
        &self,
        actor: &CombatantId,
        session: &CombatSession,
    ) -> Result<Option<ActionRequest>>;
}

/// Always passes the turn.
/// Useful for testing or as a fallback.
pub struct IdleActionProvider;

#[async_trait]
impl ActionProvider for IdleActionProvider {
    async fn provide_action(
        &self,
        _actor: &CombatantId,
        _session: &CombatSession,
    ) -> Result<Option<ActionRequest>> {
        Ok(None)
    }
}
