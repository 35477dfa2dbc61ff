//! Encounter lifecycle and action execution.
//!
//! The [`CombatEngine`] is the only writer of [`CombatSession`] state. It
//! walks the session through `Initialized → Ready → Active → Ended`, stages
//! every action on a clone and commits only on success, and owns the
//! readiness barrier transitions.

mod errors;
mod turns;

pub use errors::TurnError;
pub use turns::TurnAdvance;

use crate::action::{ActionError, ActionOutcome, ActionRequest, execute};
use crate::config::CombatConfig;
use crate::env::CombatEnv;
use crate::state::{
    BarrierStatus, CombatResult, CombatSession, CombatState, EnemyRecord, LogKind,
    PartyMemberRecord, Quorum, UserId, normalize,
};

/// Rules engine bound to one session.
pub struct CombatEngine<'a> {
    session: &'a mut CombatSession,
}

impl<'a> CombatEngine<'a> {
    pub fn new(session: &'a mut CombatSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &CombatSession {
        self.session
    }

    /// `Initialized → Ready`: merges the roster and resets the log, turn and round.
    pub fn start(
        &mut self,
        party: &[PartyMemberRecord],
        enemies: &[EnemyRecord],
        config: &CombatConfig,
    ) -> Result<(), TurnError> {
        TurnError::expect_state(self.session.combat_state, CombatState::Initialized)?;

        let combatants = normalize(party, enemies, config);
        if combatants.is_empty() {
            return Err(TurnError::EmptyRoster);
        }

        let session = &mut *self.session;
        session.combatants = combatants;
        session.battle_log.reset();
        session.current_turn = 0;
        session.round = 1;
        session.result = None;
        session.readiness.clear();
        session.combat_state = CombatState::Ready;
        Ok(())
    }

    /// `Ready → Active`.
    ///
    /// If combatant 0 is down the first living combatant takes the turn
    /// without a round increment. A roster that is already terminal ends
    /// immediately.
    pub fn begin(&mut self, env: CombatEnv<'_>) -> Result<TurnAdvance, TurnError> {
        TurnError::expect_state(self.session.combat_state, CombatState::Ready)?;
        let timestamp = env.now_millis();

        self.session.combat_state = CombatState::Active;
        let line = format!(
            "Battle begins with {} combatants.",
            self.session.combatants.len()
        );
        self.session.log(LogKind::CombatStart, timestamp, line);

        if let Some(result) = self.session.terminal_result() {
            turns::end(self.session, result, timestamp);
            return Ok(TurnAdvance::Ended(result));
        }

        turns::settle_first(self.session);
        let line = format!("It is {}'s turn.", self.current_name());
        self.session.log(LogKind::TurnStart, timestamp, line);

        Ok(TurnAdvance::Next {
            index: self.session.current_turn,
            round: self.session.round,
            wrapped: false,
        })
    }

    /// Resolves `request` and advances the turn.
    ///
    /// The session is left untouched when the request is rejected, so a
    /// second submission of an already-resolved request fails with
    /// [`ActionError::NotActorsTurn`].
    pub fn execute(
        &mut self,
        env: CombatEnv<'_>,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, ActionError> {
        let mut staged = self.session.clone();
        let mut outcome = execute::resolve(&mut staged, &env, request)?;

        if let TurnAdvance::Ended(result) = turns::advance(&mut staged, env.now_millis()) {
            outcome.combat_ended = true;
            outcome.combat_result = Some(result);
        }

        *self.session = staged;
        Ok(outcome)
    }

    /// Moves to the next living combatant without an action.
    pub fn advance(&mut self, env: CombatEnv<'_>) -> Result<TurnAdvance, TurnError> {
        TurnError::expect_state(self.session.combat_state, CombatState::Active)?;
        Ok(turns::advance(self.session, env.now_millis()))
    }

    /// Ends an active session whose roster is terminal.
    ///
    /// Returns the result if this call ended the session.
    pub fn check_terminal(&mut self, env: CombatEnv<'_>) -> Option<CombatResult> {
        if !self.session.is_active() {
            return None;
        }
        let result = self.session.terminal_result()?;
        turns::end(self.session, result, env.now_millis());
        Some(result)
    }

    /// Appends an `action_failed` entry for a rejected request.
    ///
    /// Ended sessions are final, so nothing is recorded for them.
    pub fn record_failure(
        &mut self,
        env: CombatEnv<'_>,
        request: &ActionRequest,
        error: &ActionError,
    ) -> bool {
        if self.session.is_ended() {
            return false;
        }
        let actor = self
            .session
            .combatant(&request.actor)
            .map_or_else(|| request.actor.to_string(), |c| c.name.clone());
        let line = format!("{actor} could not use {}: {error}", request.kind.profile().name);
        self.session.log(LogKind::ActionFailed, env.now_millis(), line);
        true
    }

    /// Appends a generic `error` entry.
    pub fn log_error(&mut self, env: CombatEnv<'_>, message: impl Into<String>) -> bool {
        if self.session.is_ended() {
            return false;
        }
        self.session.log(LogKind::Error, env.now_millis(), message);
        true
    }

    /// Raises the readiness barrier after an enemy turn.
    ///
    /// Only active sessions are gated; returns whether the barrier went up.
    pub fn raise_barrier(&mut self, env: CombatEnv<'_>) -> bool {
        if !self.session.is_active() {
            return false;
        }
        self.session.readiness.raise();
        self.session.log(
            LogKind::Readiness,
            env.now_millis(),
            "Waiting for the party to acknowledge the enemy's turn.",
        );
        true
    }

    /// Records `user`'s acknowledgement of the last enemy turn.
    ///
    /// The quorum is recomputed from the living party on every call.
    pub fn acknowledge(
        &mut self,
        env: CombatEnv<'_>,
        user: &UserId,
        quorum: Quorum,
    ) -> Result<BarrierStatus, TurnError> {
        TurnError::expect_state(self.session.combat_state, CombatState::Active)?;

        let participants = self.session.barrier_participants();
        let status = self
            .session
            .readiness
            .acknowledge(user, &participants, quorum)?;

        let line = match status {
            BarrierStatus::Pending { ready, required } => {
                format!("{user} is ready ({ready}/{required}).")
            }
            BarrierStatus::Cleared => "The party is ready. Play resumes.".to_owned(),
        };
        self.session.log(LogKind::Readiness, env.now_millis(), line);
        Ok(status)
    }

    fn current_name(&self) -> &str {
        self.session
            .current_combatant()
            .map_or("", |combatant| combatant.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::state::CombatantId;

    fn ready_session(party: &[PartyMemberRecord], enemies: &[EnemyRecord]) -> CombatSession {
        let mut session = CombatSession::new("s", 11);
        CombatEngine::new(&mut session)
            .start(party, enemies, &CombatConfig::default())
            .unwrap();
        session
    }

    #[test]
    fn lifecycle_requires_ordered_transitions() {
        let mut session = CombatSession::new("s", 1);
        let mut engine = CombatEngine::new(&mut session);
        let env = CombatEnv::deterministic();

        assert!(matches!(
            engine.begin(env),
            Err(TurnError::InvalidState {
                expected: CombatState::Ready,
                actual: CombatState::Initialized,
            })
        ));
        assert_eq!(
            engine.start(&[], &[], &CombatConfig::default()),
            Err(TurnError::EmptyRoster)
        );
    }

    #[test]
    fn begin_logs_start_and_first_turn() {
        let mut session = ready_session(
            &[PartyMemberRecord::new("u1", "Brom")],
            &[EnemyRecord::new("Goblin")],
        );
        let advance = CombatEngine::new(&mut session)
            .begin(CombatEnv::deterministic())
            .unwrap();

        assert_eq!(
            advance,
            TurnAdvance::Next {
                index: 0,
                round: 1,
                wrapped: false
            }
        );
        let kinds: Vec<LogKind> = session.battle_log.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::CombatStart, LogKind::TurnStart]);
    }

    #[test]
    fn begin_skips_a_fallen_first_combatant() {
        let mut session = ready_session(
            &[
                PartyMemberRecord::new("u1", "Brom").with_hp(0, 10),
                PartyMemberRecord::new("u2", "Ilsa"),
            ],
            &[EnemyRecord::new("Goblin")],
        );
        CombatEngine::new(&mut session)
            .begin(CombatEnv::deterministic())
            .unwrap();

        assert_eq!(session.current_turn, 1);
        assert_eq!(session.round, 1);
    }

    #[test]
    fn begin_with_no_enemies_is_an_immediate_victory() {
        let mut session = ready_session(&[PartyMemberRecord::new("u1", "Brom")], &[]);
        let advance = CombatEngine::new(&mut session)
            .begin(CombatEnv::deterministic())
            .unwrap();

        assert_eq!(advance, TurnAdvance::Ended(CombatResult::Victory));
        assert!(session.is_ended());
    }

    #[test]
    fn failed_execution_leaves_session_untouched() {
        let mut session = ready_session(
            &[PartyMemberRecord::new("u1", "Brom")],
            &[EnemyRecord::new("Goblin")],
        );
        let env = CombatEnv::deterministic();
        let mut engine = CombatEngine::new(&mut session);
        engine.begin(env).unwrap();
        let before = engine.session().clone();

        let request = ActionRequest::new(CombatantId::enemy(0), ActionKind::Attack)
            .with_target(CombatantId::new("u1"));
        let error = engine.execute(env, &request).unwrap_err();

        assert_eq!(engine.session(), &before);
        assert!(engine.record_failure(env, &request, &error));
        assert_eq!(
            engine.session().battle_log.last().map(|e| e.kind),
            Some(LogKind::ActionFailed)
        );
    }

    #[test]
    fn ended_sessions_reject_every_mutation() {
        let mut session = ready_session(&[PartyMemberRecord::new("u1", "Brom")], &[]);
        let env = CombatEnv::deterministic();
        let mut engine = CombatEngine::new(&mut session);
        engine.begin(env).unwrap();
        let log_len = engine.session().battle_log.len();

        assert_eq!(engine.advance(env), Err(TurnError::CombatEnded));
        assert_eq!(
            engine.acknowledge(env, &UserId::new("u1"), Quorum::Solo),
            Err(TurnError::CombatEnded)
        );
        let request = ActionRequest::new(CombatantId::new("u1"), ActionKind::Defend);
        assert_eq!(engine.execute(env, &request), Err(ActionError::CombatEnded));
        assert!(!engine.log_error(env, "late"));
        assert!(!engine.raise_barrier(env));
        assert_eq!(engine.session().battle_log.len(), log_len);
    }

    #[test]
    fn barrier_gates_actions_until_acknowledged() {
        let mut session = ready_session(
            &[
                PartyMemberRecord::new("u1", "Brom"),
                PartyMemberRecord::new("u2", "Ilsa"),
            ],
            &[EnemyRecord::new("Goblin")],
        );
        let env = CombatEnv::deterministic();
        let mut engine = CombatEngine::new(&mut session);
        engine.begin(env).unwrap();
        assert!(engine.raise_barrier(env));

        let request = ActionRequest::new(CombatantId::new("u1"), ActionKind::Defend);
        assert_eq!(
            engine.execute(env, &request),
            Err(ActionError::ReadinessPending)
        );

        assert_eq!(
            engine.acknowledge(env, &UserId::new("u1"), Quorum::LivingParty),
            Ok(BarrierStatus::Pending {
                ready: 1,
                required: 2
            })
        );
        assert_eq!(
            engine.acknowledge(env, &UserId::new("u2"), Quorum::LivingParty),
            Ok(BarrierStatus::Cleared)
        );
        assert!(engine.execute(env, &request).is_ok());
    }
}
