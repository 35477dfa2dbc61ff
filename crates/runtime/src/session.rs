//! Helpers for opening a new encounter document.

use combat_core::CombatSession;

use crate::api::Result;
use crate::repository::SessionStore;

/// Creates an empty encounter. A missing seed is drawn from the OS RNG.
pub fn new_session(id: impl Into<String>, seed: Option<u64>) -> CombatSession {
    CombatSession::new(id, seed.unwrap_or_else(rand::random))
}

/// Stores `session` and returns it stamped with the store's version.
pub async fn open_session(store: &dyn SessionStore, mut session: CombatSession) -> Result<CombatSession> {
    session.version = store.create(session.clone()).await?;
    Ok(session)
}
