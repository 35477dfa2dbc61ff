//! Cloneable façade for issuing commands to a session synchronizer.
//!
//! [`CombatClient`] hides channel plumbing and offers async helpers for
//! acting, acknowledging enemy turns, or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    ActionOutcome, ActionRequest, BarrierStatus, CombatSession, EnemyRecord, PartyMemberRecord,
    TurnAdvance, UserId,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle for one user's view of an encounter.
#[derive(Clone)]
pub struct CombatClient {
    user: UserId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl CombatClient {
    pub(crate) fn new(user: UserId, command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            user,
            command_tx,
            event_bus,
        }
    }

    /// The user this client acts for.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Resolves an action for a combatant this user controls.
    ///
    /// Rejected actions are recorded as `action_failed` in the battle log and
    /// returned as [`RuntimeError::Action`].
    pub async fn submit_action(&self, request: ActionRequest) -> Result<ActionOutcome> {
        self.request(|reply| Command::Submit { request, reply }).await?
    }

    /// Acknowledges the last enemy turn.
    pub async fn acknowledge(&self) -> Result<BarrierStatus> {
        self.request(|reply| Command::Acknowledge { reply }).await?
    }

    /// Merges the roster into the session (`Initialized → Ready`).
    pub async fn start_combat(
        &self,
        party: Vec<PartyMemberRecord>,
        enemies: Vec<EnemyRecord>,
    ) -> Result<()> {
        self.request(|reply| Command::Start {
            party,
            enemies,
            reply,
        })
        .await?
    }

    /// Starts the first turn (`Ready → Active`).
    pub async fn begin_combat(&self) -> Result<TurnAdvance> {
        self.request(|reply| Command::Begin { reply }).await?
    }

    /// Discards the local copy and reloads the stored document.
    pub async fn resync(&self) -> Result<CombatSession> {
        self.request(|reply| Command::Resync { reply }).await?
    }

    /// The synchronizer's current local copy (read-only snapshot).
    pub async fn snapshot(&self) -> Result<CombatSession> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stops the worker. Pending delayed turns are cancelled.
    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Session` - Sync, action results, conflicts and the end of combat
    /// - `Topic::Turn` - Turn handoffs
    /// - `Topic::Barrier` - Readiness barrier transitions
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
