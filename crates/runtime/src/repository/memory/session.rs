//! In-memory SessionStore implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use combat_core::{BattleLogEntry, CombatSession};
use tokio::sync::broadcast;
use tracing::debug;

use crate::repository::{
    RepositoryError, Result, SessionPatch, SessionStore, SessionSubscription,
};

const DEFAULT_CAPACITY: usize = 64;

struct Document {
    session: CombatSession,
    tx: broadcast::Sender<Arc<CombatSession>>,
}

impl Document {
    /// Bumps the version and pushes the document to subscribers.
    fn commit(&mut self) -> u64 {
        self.session.version += 1;
        // No subscribers is a normal state.
        let _ = self.tx.send(Arc::new(self.session.clone()));
        self.session.version
    }
}

/// Shared session documents held in process memory.
///
/// Every client of a local encounter holds an `Arc` to the same store, which
/// gives them the same view a remote document database would.
pub struct InMemorySessionStore {
    documents: RwLock<HashMap<String, Document>>,
    capacity: usize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a store whose subscriptions buffer up to `capacity` pushes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<CombatSession>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(documents.get(id).map(|doc| doc.session.clone()))
    }

    async fn create(&self, mut session: CombatSession) -> Result<u64> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if documents.contains_key(&session.id) {
            return Err(RepositoryError::AlreadyExists(session.id));
        }

        session.version = 1;
        let (tx, _) = broadcast::channel(self.capacity);
        debug!(target: "combat::store", session = %session.id, "session created");
        documents.insert(session.id.clone(), Document { session, tx });
        Ok(1)
    }

    async fn update(&self, id: &str, expected_version: u64, patch: SessionPatch) -> Result<u64> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let doc = documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_owned()))?;

        if doc.session.version != expected_version {
            debug!(
                target: "combat::store",
                session = id,
                expected = expected_version,
                actual = doc.session.version,
                "rejected stale write"
            );
            return Err(RepositoryError::StaleWrite {
                session_id: id.to_owned(),
                expected: expected_version,
                actual: doc.session.version,
            });
        }

        let fields = patch.fields();
        patch.apply_to(&mut doc.session);
        let version = doc.commit();
        debug!(target: "combat::store", session = id, version, ?fields, "session updated");
        Ok(version)
    }

    async fn append_log_entry(&self, id: &str, entry: BattleLogEntry) -> Result<u64> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let doc = documents
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_owned()))?;
        if doc.session.is_ended() {
            debug!(
                target: "combat::store",
                session = id,
                kind = %entry.kind,
                "rejected append to ended session"
            );
            return Err(RepositoryError::SessionEnded(id.to_owned()));
        }

        let next_id = doc.session.battle_log.next_id();
        let entry = BattleLogEntry {
            id: entry.id.max(next_id),
            ..entry
        };
        doc.session.battle_log.append(entry);
        Ok(doc.commit())
    }

    async fn subscribe(&self, id: &str) -> Result<SessionSubscription> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let doc = documents
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_owned()))?;
        Ok(SessionSubscription::new(id, doc.tx.subscribe()))
    }
}
