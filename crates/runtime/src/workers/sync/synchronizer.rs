//! Local copy of one encounter and the logic that keeps it in step with the
//! shared document.

use std::sync::Arc;

use combat_core::{
    ActionError, ActionOutcome, ActionRequest, BarrierStatus, CombatEngine, CombatEnv, CombatError,
    CombatSession, EnemyRecord, ErrorSeverity, PartyMemberRecord, Quorum, SessionDelta,
    TurnAdvance, TurnStamp, UserId,
};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::{ActionProvider, Result, RuntimeError};
use crate::clock::live_env;
use crate::config::SyncConfig;
use crate::events::{BarrierEvent, EventBus, SessionEvent, TurnEvent};
use crate::repository::{RepositoryError, SessionPatch, SessionStore};

/// Acknowledgements are idempotent, so a conflicting write is retried on the
/// reloaded document this many times.
const ACK_RETRIES: usize = 3;

/// Deferred work keyed to the turn it was planned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Job {
    EnemyTurn,
    /// Local user's turn on autopilot.
    Autopilot,
    /// Autopilot acknowledgement of an enemy turn.
    Acknowledge,
    /// Recovery after a turn failed unexpectedly.
    ForceAdvance,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Scheduled {
    pub job: Job,
    pub stamp: TurnStamp,
    pub at: Instant,
}

/// What happened to a turn the synchronizer drove itself.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TurnOutcome {
    Resolved(ActionOutcome),
    /// The provider had nothing to do; the turn was passed.
    Passed,
    /// Another client resolved the turn first.
    Superseded,
    Failed { stamp: TurnStamp, error: String },
}

pub(crate) struct SessionSynchronizer {
    session: CombatSession,
    /// Last turn this client resolved on behalf of an enemy or autopilot.
    last_processed: Option<TurnStamp>,
    scheduled: Option<Scheduled>,
    user: UserId,
    store: Arc<dyn SessionStore>,
    enemy_provider: Arc<dyn ActionProvider>,
    autopilot: Option<Arc<dyn ActionProvider>>,
    config: SyncConfig,
    events: EventBus,
}

impl SessionSynchronizer {
    pub fn new(
        session: CombatSession,
        user: UserId,
        store: Arc<dyn SessionStore>,
        enemy_provider: Arc<dyn ActionProvider>,
        autopilot: Option<Arc<dyn ActionProvider>>,
        config: SyncConfig,
        events: EventBus,
    ) -> Self {
        let mut sync = Self {
            session,
            last_processed: None,
            scheduled: None,
            user,
            store,
            enemy_provider,
            autopilot,
            config,
            events,
        };
        sync.reschedule();
        sync
    }

    pub fn session(&self) -> &CombatSession {
        &self.session
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.scheduled.map(|scheduled| scheduled.at)
    }

    // ===== remote pushes =====

    /// Adopts a pushed document. The store is authoritative; pushes this
    /// client has already seen are ignored.
    pub async fn apply_remote(&mut self, remote: Arc<CombatSession>) {
        if remote.version <= self.session.version {
            return;
        }
        self.replace(Arc::unwrap_or_clone(remote));
        self.settle_terminal().await;
    }

    /// Ends an active session whose roster no longer allows play.
    async fn settle_terminal(&mut self) {
        if !self.session.is_active() || self.session.terminal_result().is_none() {
            return;
        }
        let env = live_env();
        if let Err(error) = self
            .commit(move |session| Ok(CombatEngine::new(session).check_terminal(env)))
            .await
        {
            warn!(target: "combat::sync", %error, "failed to end finished encounter");
        }
    }

    fn replace(&mut self, next: CombatSession) {
        let previous = std::mem::replace(&mut self.session, next);
        self.reconcile(&previous);
        self.publish_changes(&previous);
        self.reschedule();
    }

    /// A stamp older than the last processed one, or an encounter that just
    /// became active again, means play was rewound: turns are processed again
    /// from scratch.
    fn reconcile(&mut self, previous: &CombatSession) {
        let Some(last) = self.last_processed else {
            return;
        };
        let stamp = self.session.turn_stamp();
        if stamp < last {
            debug!(target: "combat::sync", %stamp, %last, "turn stamp regressed; resetting");
            self.last_processed = None;
        } else if self.session.is_active() && !previous.is_active() {
            debug!(target: "combat::sync", %stamp, %last, "encounter restarted; resetting");
            self.last_processed = None;
        }
    }

    fn publish_changes(&self, previous: &CombatSession) {
        let session = &self.session;
        let stamp = session.turn_stamp();

        self.events.publish(SessionEvent::Synced {
            version: session.version,
            stamp,
        });

        if session.is_active()
            && (!previous.is_active() || previous.turn_stamp() != stamp)
            && let Some(current) = session.current_combatant()
        {
            self.events.publish(TurnEvent {
                stamp,
                combatant: current.id.clone(),
                controller: current.controller.clone(),
            });
        }

        let (before, after) = (&previous.readiness, &session.readiness);
        if after.is_pending() && !before.is_pending() {
            self.events.publish(BarrierEvent::Raised { stamp });
        }
        if after.is_pending() {
            let participants = session.barrier_participants();
            let required = match self.config.quorum() {
                Quorum::LivingParty => participants.len(),
                Quorum::Solo => 1,
            };
            let ready = after.ready().intersection(&participants).count();
            for user in after.ready().difference(before.ready()) {
                self.events.publish(BarrierEvent::Acknowledged {
                    user: user.clone(),
                    ready,
                    required,
                });
            }
        }
        if before.is_pending() && !after.is_pending() && session.is_active() {
            self.events.publish(BarrierEvent::Cleared);
        }

        if session.is_ended()
            && !previous.is_ended()
            && let Some(result) = session.result
        {
            info!(target: "combat::sync", session = %session.id, %result, "combat ended");
            self.events.publish(SessionEvent::Ended { result });
        }
    }

    // ===== writes =====

    /// Runs `op` on a staged copy and pushes the fields it changed.
    ///
    /// The write is stamped with the local version. If another client wrote
    /// first, the local copy is reloaded and the staged result dropped.
    async fn commit<T>(&mut self, op: impl FnOnce(&mut CombatSession) -> Result<T>) -> Result<T> {
        let mut staged = self.session.clone();
        let value = op(&mut staged)?;

        let delta = SessionDelta::from_sessions(&self.session, &staged);
        let patch = SessionPatch::from_delta(&delta, &staged);
        if patch.is_empty() {
            return Ok(value);
        }

        let expected = self.session.version;
        let pushed = self.store.update(&self.session.id, expected, patch).await;
        match pushed {
            Ok(version) => {
                debug!(
                    target: "combat::sync",
                    session = %staged.id,
                    version,
                    fields = ?delta.fields,
                    "pushed session patch"
                );
                staged.version = version;
                self.replace(staged);
                Ok(value)
            }
            Err(RepositoryError::StaleWrite { actual, .. }) => {
                info!(
                    target: "combat::sync",
                    session = %self.session.id,
                    expected,
                    actual,
                    "write conflict; reloading session"
                );
                self.events
                    .publish(SessionEvent::WriteConflict { expected, actual });
                self.reload().await?;
                Err(RuntimeError::StaleSession { expected, actual })
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Appends one log line outside the versioned write path.
    ///
    /// Used for failure records, which must land even when the document moved
    /// on underneath this client.
    async fn append_log(&mut self, write: impl FnOnce(&mut CombatEngine<'_>, CombatEnv<'static>) -> bool) {
        let mut staged = self.session.clone();
        if !write(&mut CombatEngine::new(&mut staged), live_env()) {
            return;
        }
        let Some(entry) = staged.battle_log.last().cloned() else {
            return;
        };

        let appended = self
            .store
            .append_log_entry(&self.session.id, entry.clone())
            .await;
        match appended {
            Ok(version) if version == self.session.version + 1 => {
                let mut next = self.session.clone();
                next.battle_log.append(entry);
                next.version = version;
                self.replace(next);
            }
            Ok(_) => {
                if let Err(error) = self.reload().await {
                    warn!(target: "combat::sync", %error, "reload after log append failed");
                }
            }
            Err(RepositoryError::SessionEnded(_)) => {
                debug!(target: "combat::sync", "session ended elsewhere; dropping log entry");
                if let Err(error) = self.reload().await {
                    warn!(target: "combat::sync", %error, "reload after log append failed");
                }
            }
            Err(error) => {
                warn!(target: "combat::sync", %error, "failed to append battle-log entry");
            }
        }
    }

    async fn reload(&mut self) -> Result<()> {
        let stored = self
            .store
            .get(&self.session.id)
            .await?
            .ok_or_else(|| RuntimeError::SessionNotFound(self.session.id.clone()))?;
        self.replace(stored);
        Ok(())
    }

    // ===== commands =====

    pub async fn submit_action(&mut self, request: ActionRequest) -> Result<ActionOutcome> {
        if self.session.is_active()
            && let Some(current) = self.session.current_combatant()
            && current.owner() != Some(&self.user)
        {
            return Err(RuntimeError::NotYourTurn {
                user: self.user.clone(),
                current: current.id.clone(),
            });
        }

        let env = live_env();
        let staged_request = request.clone();
        let result = self
            .commit(move |session| Ok(CombatEngine::new(session).execute(env, &staged_request)?))
            .await;

        match result {
            Ok(outcome) => {
                self.publish_resolved(&request, &outcome);
                Ok(outcome)
            }
            Err(RuntimeError::Action(error)) => {
                self.reject_action(&request, &error).await;
                Err(RuntimeError::Action(error))
            }
            Err(other) => Err(other),
        }
    }

    /// Reports a request the rules refused and records it as `action_failed`.
    async fn reject_action(&mut self, request: &ActionRequest, error: &ActionError) {
        debug!(
            target: "combat::sync",
            actor = %request.actor,
            kind = %request.kind,
            code = error.error_code(),
            %error,
            "action rejected"
        );
        self.events.publish(SessionEvent::ActionFailed {
            actor: request.actor.clone(),
            kind: request.kind,
            code: error.error_code().to_owned(),
            error: error.to_string(),
        });
        self.append_log(|engine, env| engine.record_failure(env, request, error))
            .await;
    }

    pub async fn acknowledge(&mut self) -> Result<BarrierStatus> {
        let quorum = self.config.quorum();
        let mut attempts = 0;
        loop {
            let user = self.user.clone();
            let env = live_env();
            let result = self
                .commit(move |session| {
                    Ok(CombatEngine::new(session).acknowledge(env, &user, quorum)?)
                })
                .await;
            match result {
                Err(RuntimeError::StaleSession { .. }) if attempts < ACK_RETRIES => attempts += 1,
                other => return other,
            }
        }
    }

    pub async fn start(
        &mut self,
        party: Vec<PartyMemberRecord>,
        enemies: Vec<EnemyRecord>,
    ) -> Result<()> {
        let config = self.config.combat.clone();
        self.commit(move |session| {
            Ok(CombatEngine::new(session).start(&party, &enemies, &config)?)
        })
        .await
    }

    pub async fn begin(&mut self) -> Result<TurnAdvance> {
        let env = live_env();
        self.commit(move |session| Ok(CombatEngine::new(session).begin(env)?))
            .await
    }

    pub async fn resync(&mut self) -> Result<CombatSession> {
        self.reload().await?;
        self.settle_terminal().await;
        Ok(self.session.clone())
    }

    fn publish_resolved(&self, request: &ActionRequest, outcome: &ActionOutcome) {
        let target = request
            .target
            .clone()
            .unwrap_or_else(|| request.actor.clone());
        self.events.publish(SessionEvent::resolved(
            request.actor.clone(),
            request.kind,
            target,
            outcome,
        ));
    }

    // ===== scheduled turns =====

    /// The job the current session calls for, if this client should act.
    fn next_job(&self) -> Option<Job> {
        let session = &self.session;
        if !session.is_active() {
            return None;
        }

        if session.readiness.is_pending() {
            let waiting_on_us = self.autopilot.is_some()
                && session.barrier_participants().contains(&self.user)
                && !session.readiness.ready().contains(&self.user);
            return waiting_on_us.then_some(Job::Acknowledge);
        }

        let current = session.current_combatant()?;
        let stamp = session.turn_stamp();
        if !current.is_alive() || self.last_processed.is_some_and(|last| last >= stamp) {
            return None;
        }

        if current.is_enemy() {
            Some(Job::EnemyTurn)
        } else if self.autopilot.is_some() && current.owner() == Some(&self.user) {
            Some(Job::Autopilot)
        } else {
            None
        }
    }

    fn reschedule(&mut self) {
        let stamp = self.session.turn_stamp();

        if let Some(current) = self.scheduled
            && current.job == Job::ForceAdvance
            && current.stamp == stamp
            && self.session.is_active()
        {
            return;
        }

        let wanted = self.next_job();
        if let (Some(current), Some(job)) = (self.scheduled, wanted)
            && current.job == job
            && current.stamp == stamp
        {
            return;
        }

        self.scheduled = wanted.map(|job| Scheduled {
            job,
            stamp,
            at: Instant::now() + self.config.enemy_turn_delay,
        });
    }

    /// Runs the job whose deadline passed, if it still applies.
    pub async fn run_scheduled(&mut self) -> Option<TurnOutcome> {
        let scheduled = self.scheduled.take()?;
        let still_due = scheduled.stamp == self.session.turn_stamp()
            && (scheduled.job == Job::ForceAdvance || self.next_job() == Some(scheduled.job));
        if !still_due {
            self.reschedule();
            return None;
        }

        let outcome = match scheduled.job {
            Job::EnemyTurn => {
                let provider = Arc::clone(&self.enemy_provider);
                Some(self.play_turn(provider, true).await)
            }
            Job::Autopilot => match self.autopilot.clone() {
                Some(provider) => Some(self.play_turn(provider, false).await),
                None => None,
            },
            Job::Acknowledge => {
                if let Err(error) = self.acknowledge().await {
                    debug!(target: "combat::sync", %error, "autopilot acknowledgement failed");
                }
                None
            }
            Job::ForceAdvance => {
                self.force_advance(scheduled.stamp).await;
                None
            }
        };

        if self.scheduled.is_none() {
            self.reschedule();
        }
        outcome
    }

    /// Resolves the current turn with `provider`'s decision.
    ///
    /// Enemy turns raise the readiness barrier once resolved.
    async fn play_turn(&mut self, provider: Arc<dyn ActionProvider>, raise_barrier: bool) -> TurnOutcome {
        let stamp = self.session.turn_stamp();
        self.last_processed = Some(stamp);

        let Some(actor) = self.session.current_combatant().map(|c| c.id.clone()) else {
            return TurnOutcome::Passed;
        };
        debug!(target: "combat::sync", %stamp, %actor, "processing turn");

        let env = live_env();
        let decision = provider.provide_action(&actor, &self.session).await;
        let attempted = match &decision {
            Ok(Some(request)) => Some(request.clone()),
            _ => None,
        };
        let result = match decision {
            Ok(Some(request)) => {
                self.commit(move |session| {
                    let mut engine = CombatEngine::new(session);
                    let outcome = engine.execute(env, &request)?;
                    if raise_barrier {
                        engine.raise_barrier(env);
                    }
                    Ok(Some((request, outcome)))
                })
                .await
            }
            Ok(None) => {
                self.commit(move |session| {
                    let mut engine = CombatEngine::new(session);
                    engine.advance(env)?;
                    if raise_barrier {
                        engine.raise_barrier(env);
                    }
                    Ok(None)
                })
                .await
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(Some((request, outcome))) => {
                self.publish_resolved(&request, &outcome);
                TurnOutcome::Resolved(outcome)
            }
            Ok(None) => TurnOutcome::Passed,
            Err(RuntimeError::StaleSession { .. }) => TurnOutcome::Superseded,
            Err(RuntimeError::Action(error)) if attempted.is_some() => {
                if let Some(request) = &attempted {
                    self.reject_action(request, &error).await;
                }
                warn!(
                    target: "combat::sync",
                    %stamp,
                    %error,
                    "turn decision rejected; forcing advance"
                );
                self.schedule_force_advance(stamp);
                TurnOutcome::Failed {
                    stamp,
                    error: error.to_string(),
                }
            }
            Err(error) => {
                let severity = error.severity();
                let error = error.to_string();
                self.fail_turn(stamp, severity, &error).await;
                TurnOutcome::Failed { stamp, error }
            }
        }
    }

    /// Logs an unexpected failure and plans a forced advance so the
    /// encounter cannot stall on this turn.
    async fn fail_turn(&mut self, stamp: TurnStamp, severity: ErrorSeverity, error: &str) {
        if severity.is_internal() {
            error!(target: "combat::sync", %stamp, %error, "turn failed; forcing advance");
        } else {
            warn!(target: "combat::sync", %stamp, %severity, %error, "turn failed; forcing advance");
        }

        let message = format!("Turn {stamp} could not be resolved: {error}");
        self.append_log(|engine, env| engine.log_error(env, message))
            .await;
        self.schedule_force_advance(stamp);
    }

    fn schedule_force_advance(&mut self, stamp: TurnStamp) {
        if self.session.is_active() && self.session.turn_stamp() == stamp {
            self.scheduled = Some(Scheduled {
                job: Job::ForceAdvance,
                stamp,
                at: Instant::now() + self.config.error_retry_delay,
            });
        }
    }

    async fn force_advance(&mut self, stamp: TurnStamp) {
        if !self.session.is_active() || self.session.turn_stamp() != stamp {
            return;
        }
        let raise_barrier = self
            .session
            .current_combatant()
            .is_some_and(|current| current.is_enemy());

        let env = live_env();
        let result = self
            .commit(move |session| {
                let mut engine = CombatEngine::new(session);
                let advance = engine.advance(env)?;
                if raise_barrier {
                    engine.raise_barrier(env);
                }
                Ok(advance)
            })
            .await;

        match result {
            Ok(TurnAdvance::Ended(result)) => {
                debug!(target: "combat::sync", %stamp, %result, "forced advance ended combat");
            }
            Ok(TurnAdvance::Next { .. }) => {
                debug!(target: "combat::sync", %stamp, "forced advance");
            }
            Err(error) => {
                warn!(target: "combat::sync", %stamp, %error, "forced advance failed");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scheduled_job(&self) -> Option<Job> {
        self.scheduled.map(|scheduled| scheduled.job)
    }
}
