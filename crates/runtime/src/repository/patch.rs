//! Field-level session writes.

use combat_core::{
    BattleLog, BattleLogEntry, ChangedFields, CombatResult, CombatSession, CombatState, Combatant,
    ReadinessBarrier, SessionDelta,
};
use serde::{Deserialize, Serialize};

/// New battle-log content carried by a patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "entries", rename_all = "snake_case")]
pub enum LogPatch {
    /// Entries appended after the writer's base version.
    Append(Vec<BattleLogEntry>),
    /// The whole log, used when an encounter restarts.
    Replace(BattleLog),
}

/// The subset of session fields a transition changed.
///
/// Built from a [`SessionDelta`] so a client only overwrites what it touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combatants: Option<Vec<Combatant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_state: Option<CombatState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Option<CombatResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_log: Option<LogPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessBarrier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_up_opportunities: Option<Vec<String>>,
}

impl SessionPatch {
    /// Copies the fields flagged in `delta` out of `after`.
    pub fn from_delta(delta: &SessionDelta, after: &CombatSession) -> Self {
        let fields = delta.fields;
        let mut patch = Self::default();

        if fields.contains(ChangedFields::COMBATANTS) {
            patch.combatants = Some(after.combatants.clone());
        }
        if fields.contains(ChangedFields::CURRENT_TURN) {
            patch.current_turn = Some(after.current_turn);
        }
        if fields.contains(ChangedFields::ROUND) {
            patch.round = Some(after.round);
        }
        if fields.contains(ChangedFields::COMBAT_STATE) {
            patch.combat_state = Some(after.combat_state);
        }
        if fields.contains(ChangedFields::RESULT) {
            patch.result = Some(after.result);
        }
        if fields.contains(ChangedFields::BATTLE_LOG) {
            patch.battle_log = Some(if delta.log_reset {
                LogPatch::Replace(after.battle_log.clone())
            } else {
                LogPatch::Append(after.battle_log.since(delta.log_watermark).to_vec())
            });
        }
        if fields.contains(ChangedFields::READINESS) {
            patch.readiness = Some(after.readiness.clone());
        }
        if fields.contains(ChangedFields::STORY) {
            patch.story_context = Some(after.story_context.clone());
            patch.environmental_features = Some(after.environmental_features.clone());
            patch.team_up_opportunities = Some(after.team_up_opportunities.clone());
        }

        patch
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Fields this patch overwrites.
    pub fn fields(&self) -> ChangedFields {
        let mut fields = ChangedFields::empty();
        fields.set(ChangedFields::COMBATANTS, self.combatants.is_some());
        fields.set(ChangedFields::CURRENT_TURN, self.current_turn.is_some());
        fields.set(ChangedFields::ROUND, self.round.is_some());
        fields.set(ChangedFields::COMBAT_STATE, self.combat_state.is_some());
        fields.set(ChangedFields::RESULT, self.result.is_some());
        fields.set(ChangedFields::BATTLE_LOG, self.battle_log.is_some());
        fields.set(ChangedFields::READINESS, self.readiness.is_some());
        fields.set(
            ChangedFields::STORY,
            self.story_context.is_some()
                || self.environmental_features.is_some()
                || self.team_up_opportunities.is_some(),
        );
        fields
    }

    /// Writes the carried fields into `session`. The version is left alone.
    pub fn apply_to(self, session: &mut CombatSession) {
        if let Some(combatants) = self.combatants {
            session.combatants = combatants;
        }
        if let Some(current_turn) = self.current_turn {
            session.current_turn = current_turn;
        }
        if let Some(round) = self.round {
            session.round = round;
        }
        if let Some(state) = self.combat_state {
            session.combat_state = state;
        }
        if let Some(result) = self.result {
            session.result = result;
        }
        match self.battle_log {
            Some(LogPatch::Append(entries)) => {
                for entry in entries {
                    session.battle_log.append(entry);
                }
            }
            Some(LogPatch::Replace(log)) => session.battle_log = log,
            None => {}
        }
        if let Some(readiness) = self.readiness {
            session.readiness = readiness;
        }
        if let Some(story_context) = self.story_context {
            session.story_context = story_context;
        }
        if let Some(features) = self.environmental_features {
            session.environmental_features = features;
        }
        if let Some(opportunities) = self.team_up_opportunities {
            session.team_up_opportunities = opportunities;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{CombatEngine, CombatEnv, CombatConfig, EnemyRecord, PartyMemberRecord};

    fn started() -> CombatSession {
        let mut session = CombatSession::new("s", 3);
        CombatEngine::new(&mut session)
            .start(
                &[PartyMemberRecord::new("u1", "Brom")],
                &[EnemyRecord::new("Goblin")],
                &CombatConfig::default(),
            )
            .unwrap();
        session
    }

    #[test]
    fn carries_only_changed_fields() {
        let before = started();
        let mut after = before.clone();
        CombatEngine::new(&mut after)
            .begin(CombatEnv::deterministic())
            .unwrap();

        let delta = SessionDelta::from_sessions(&before, &after);
        let patch = SessionPatch::from_delta(&delta, &after);

        assert!(patch.combatants.is_none());
        assert_eq!(patch.combat_state, Some(CombatState::Active));
        assert!(matches!(patch.battle_log, Some(LogPatch::Append(ref e)) if e.len() == 2));
        assert_eq!(patch.fields(), delta.fields);

        let mut remote = before.clone();
        patch.apply_to(&mut remote);
        assert_eq!(remote, after);
    }

    #[test]
    fn restart_replaces_the_log() {
        let mut before = started();
        CombatEngine::new(&mut before)
            .begin(CombatEnv::deterministic())
            .unwrap();

        let mut after = before.clone();
        after.combat_state = CombatState::Initialized;
        CombatEngine::new(&mut after)
            .start(
                &[PartyMemberRecord::new("u1", "Brom")],
                &[EnemyRecord::new("Orc")],
                &CombatConfig::default(),
            )
            .unwrap();

        let delta = SessionDelta::from_sessions(&before, &after);
        let patch = SessionPatch::from_delta(&delta, &after);
        assert!(matches!(patch.battle_log, Some(LogPatch::Replace(_))));

        let mut remote = before;
        patch.apply_to(&mut remote);
        assert!(remote.battle_log.is_empty());
        assert_eq!(remote.combatants[1].name, "Orc");
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let patch = SessionPatch::default();
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "{}");
    }
}
