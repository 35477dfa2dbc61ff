//! Sync worker that owns one client's copy of a shared encounter.
//!
//! Receives commands from [`CombatClient`], adopts documents pushed by the
//! session store, and resolves enemy turns once their presentation delay has
//! passed.
//!
//! [`CombatClient`]: crate::api::CombatClient

mod synchronizer;

pub(crate) use synchronizer::SessionSynchronizer;

use combat_core::{
    ActionOutcome, ActionRequest, BarrierStatus, CombatSession, EnemyRecord, PartyMemberRecord,
    TurnAdvance,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::Result;
use crate::repository::SessionSubscription;

/// Commands that can be sent to the sync worker
pub enum Command {
    Submit {
        request: ActionRequest,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    Acknowledge {
        reply: oneshot::Sender<Result<BarrierStatus>>,
    },
    Start {
        party: Vec<PartyMemberRecord>,
        enemies: Vec<EnemyRecord>,
        reply: oneshot::Sender<Result<()>>,
    },
    Begin {
        reply: oneshot::Sender<Result<TurnAdvance>>,
    },
    Resync {
        reply: oneshot::Sender<Result<CombatSession>>,
    },
    /// Query the local session copy (read-only).
    Snapshot {
        reply: oneshot::Sender<CombatSession>,
    },
    Shutdown,
}

/// Background task that keeps one client in step with the shared session.
pub(crate) struct SyncWorker {
    sync: SessionSynchronizer,
    command_rx: mpsc::Receiver<Command>,
    subscription: SessionSubscription,
}

impl SyncWorker {
    pub fn new(
        sync: SessionSynchronizer,
        command_rx: mpsc::Receiver<Command>,
        subscription: SessionSubscription,
    ) -> Self {
        Self {
            sync,
            command_rx,
            subscription,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            let deadline = self.sync.deadline();
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                pushed = self.subscription.next() => match pushed {
                    Some(session) => self.sync.apply_remote(session).await,
                    None => {
                        warn!(
                            target: "combat::sync",
                            session = self.subscription.session_id(),
                            "session feed closed"
                        );
                        break;
                    }
                },
                () = sleep_until(deadline) => {
                    if let Some(outcome) = self.sync.run_scheduled().await {
                        debug!(target: "combat::sync", ?outcome, "scheduled turn finished");
                    }
                }
            }
        }
        debug!(target: "combat::sync", session = %self.sync.session().id, "sync worker stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { request, reply } => {
                let _ = reply.send(self.sync.submit_action(request).await);
            }
            Command::Acknowledge { reply } => {
                let _ = reply.send(self.sync.acknowledge().await);
            }
            Command::Start {
                party,
                enemies,
                reply,
            } => {
                let _ = reply.send(self.sync.start(party, enemies).await);
            }
            Command::Begin { reply } => {
                let _ = reply.send(self.sync.begin().await);
            }
            Command::Resync { reply } => {
                let _ = reply.send(self.sync.resync().await);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.sync.session().clone());
            }
            Command::Shutdown => {}
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
