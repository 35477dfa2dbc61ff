//! High-level runtime orchestrator.
//!
//! The runtime owns one client's sync worker, wires up command/event channels,
//! and exposes a builder-based API for attaching to a stored encounter.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use combat_core::UserId;

use crate::api::{ActionProvider, CombatClient, Result, RuntimeError};
use crate::config::SyncConfig;
use crate::events::{Event, EventBus, Topic};
use crate::providers::EnemyPolicy;
use crate::repository::SessionStore;
use crate::workers::{Command, SessionSynchronizer, SyncWorker};

/// One client attached to a shared encounter.
///
/// Design: the runtime owns the worker and coordinates shutdown.
/// [`CombatClient`] provides a cloneable façade for callers.
pub struct SyncRuntime {
    handle: CombatClient,
    worker_handle: JoinHandle<()>,
}

impl SyncRuntime {
    /// Create a new runtime builder
    pub fn builder() -> SyncRuntimeBuilder {
        SyncRuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across tasks.
    pub fn handle(&self) -> CombatClient {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Stop the worker and wait for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone if its feed closed.
        let _ = self.handle.shutdown().await;
        drop(self.handle);
        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`SyncRuntime`] with flexible configuration.
pub struct SyncRuntimeBuilder {
    config: SyncConfig,
    store: Option<Arc<dyn SessionStore>>,
    session_id: String,
    user: UserId,
    enemy_provider: Arc<dyn ActionProvider>,
    autopilot: Option<Arc<dyn ActionProvider>>,
}

impl SyncRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: SyncConfig::default(),
            store: None,
            session_id: String::new(),
            user: UserId::new(""),
            enemy_provider: Arc::new(EnemyPolicy),
            autopilot: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required session store
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Encounter to attach to
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// User this client acts for
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = UserId::new(user);
        self
    }

    /// Replace the enemy policy (default: [`EnemyPolicy`])
    pub fn enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.enemy_provider = Arc::new(provider);
        self
    }

    /// Play the user's turns and acknowledge enemy turns with `provider`
    pub fn autopilot(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.autopilot = Some(Arc::new(provider));
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<SyncRuntime> {
        let store = self.store.ok_or(RuntimeError::MissingStore)?;

        // Subscribe before loading so no write between the two is missed.
        let subscription = store.subscribe(&self.session_id).await?;
        let session = store
            .get(&self.session_id)
            .await?
            .ok_or_else(|| RuntimeError::SessionNotFound(self.session_id.clone()))?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = CombatClient::new(self.user.clone(), command_tx, events.clone());

        info!(
            target: "combat::sync",
            session = %session.id,
            user = %self.user,
            version = session.version,
            autopilot = self.autopilot.is_some(),
            "attached to session"
        );

        let sync = SessionSynchronizer::new(
            session,
            self.user,
            store,
            self.enemy_provider,
            self.autopilot,
            self.config,
            events,
        );
        let worker = SyncWorker::new(sync, command_rx, subscription);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(SyncRuntime {
            handle,
            worker_handle,
        })
    }
}
