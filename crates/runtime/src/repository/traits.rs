//! Contract of the shared session document store.

use std::sync::Arc;

use async_trait::async_trait;
use combat_core::{BattleLogEntry, CombatSession};
use tokio::sync::broadcast;
use tracing::warn;

use super::error::Result;
use super::patch::SessionPatch;

/// Shared store holding one document per encounter.
///
/// Every successful write bumps the document version and pushes the full
/// document to all subscribers. Writers state the version their change was
/// computed against; the store rejects the write if another client got there
/// first.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the current document.
    async fn get(&self, id: &str) -> Result<Option<CombatSession>>;

    /// Stores a new document and returns its initial version.
    async fn create(&self, session: CombatSession) -> Result<u64>;

    /// Applies `patch` if the stored version still equals `expected_version`.
    ///
    /// Returns the new version.
    async fn update(&self, id: &str, expected_version: u64, patch: SessionPatch) -> Result<u64>;

    /// Appends one battle-log entry regardless of the document version.
    ///
    /// Entries whose id is not newer than the stored log are re-numbered.
    /// Fails with `RepositoryError::SessionEnded` once the stored session has
    /// ended. Returns the new version.
    async fn append_log_entry(&self, id: &str, entry: BattleLogEntry) -> Result<u64>;

    /// Starts receiving every future write to the document.
    async fn subscribe(&self, id: &str) -> Result<SessionSubscription>;
}

/// Live feed of one session document. Dropping it unsubscribes.
pub struct SessionSubscription {
    session_id: String,
    rx: broadcast::Receiver<Arc<CombatSession>>,
}

impl SessionSubscription {
    pub fn new(session_id: impl Into<String>, rx: broadcast::Receiver<Arc<CombatSession>>) -> Self {
        Self {
            session_id: session_id.into(),
            rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Waits for the next pushed document.
    ///
    /// A lagging subscriber skips the documents it missed; every push carries
    /// the whole document, so only the newest one matters. Returns `None`
    /// once the store drops the document.
    pub async fn next(&mut self) -> Option<Arc<CombatSession>> {
        loop {
            match self.rx.recv().await {
                Ok(session) => return Some(session),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        target: "combat::store",
                        session = %self.session_id,
                        skipped,
                        "subscriber lagged behind session pushes"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl std::fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
