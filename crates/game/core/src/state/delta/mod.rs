mod bitmask;

pub use bitmask::ChangedFields;

use super::CombatSession;

/// Minimal description of a transition's impact on a session.
///
/// Stores which fields changed plus the id of the last battle-log entry that
/// existed before the transition, so a writer can push only the new entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionDelta {
    pub fields: ChangedFields,
    /// Last log id present before the transition (0 for an empty log).
    pub log_watermark: u64,
    /// The log was cleared rather than appended to (encounter restart).
    pub log_reset: bool,
}

impl SessionDelta {
    /// Creates a delta by comparing two sessions field by field.
    pub fn from_sessions(before: &CombatSession, after: &CombatSession) -> Self {
        let mut fields = ChangedFields::empty();

        if before.combatants != after.combatants {
            fields |= ChangedFields::COMBATANTS;
        }
        if before.current_turn != after.current_turn {
            fields |= ChangedFields::CURRENT_TURN;
        }
        if before.round != after.round {
            fields |= ChangedFields::ROUND;
        }
        if before.combat_state != after.combat_state {
            fields |= ChangedFields::COMBAT_STATE;
        }
        if before.result != after.result {
            fields |= ChangedFields::RESULT;
        }
        let mut log_reset = false;
        if before.battle_log != after.battle_log {
            fields |= ChangedFields::BATTLE_LOG;
            log_reset = !after
                .battle_log
                .entries()
                .starts_with(before.battle_log.entries());
        }
        if before.readiness != after.readiness {
            fields |= ChangedFields::READINESS;
        }
        if before.story_context != after.story_context
            || before.environmental_features != after.environmental_features
            || before.team_up_opportunities != after.team_up_opportunities
        {
            fields |= ChangedFields::STORY;
        }

        Self {
            fields,
            log_watermark: before.battle_log.last().map_or(0, |entry| entry.id),
            log_reset,
        }
    }

    /// Returns true if no field changed (no-op transition).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn touches(&self, fields: ChangedFields) -> bool {
        self.fields.intersects(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatState, LogKind};

    #[test]
    fn tracks_changed_fields_and_watermark() {
        let mut before = CombatSession::new("s", 0);
        before.log(LogKind::CombatStart, 0, "begin");

        let mut after = before.clone();
        after.round = 2;
        after.log(LogKind::TurnAdvance, 0, "next");

        let delta = SessionDelta::from_sessions(&before, &after);
        assert!(delta.touches(ChangedFields::ROUND | ChangedFields::BATTLE_LOG));
        assert!(!delta.touches(ChangedFields::COMBATANTS));
        assert_eq!(delta.log_watermark, 1);
        assert!(!delta.log_reset);
    }

    #[test]
    fn cleared_log_is_a_reset() {
        let mut before = CombatSession::new("s", 0);
        before.log(LogKind::CombatEnd, 0, "over");

        let mut after = before.clone();
        after.battle_log.reset();
        after.combat_state = CombatState::Ready;

        let delta = SessionDelta::from_sessions(&before, &after);
        assert!(delta.log_reset);
        assert!(SessionDelta::from_sessions(&after, &after).is_empty());
    }
}
