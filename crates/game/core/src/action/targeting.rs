//! Target policies.
//!
//! Policies are relative to the actor's side, so one rule table serves both
//! players and enemies. Dead combatants are never legal targets.

use crate::state::{CombatSession, Combatant, CombatantId};

use super::ActionKind;

/// Which combatants an action may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TargetPolicy {
    /// Living combatants on the other side.
    Opponents,
    /// Living combatants on the actor's side, excluding the actor.
    AlliesExcludingSelf,
    /// The actor itself. A missing target defaults to the actor.
    SelfOnly,
}

impl TargetPolicy {
    pub fn admits(&self, actor: &Combatant, target: &Combatant) -> bool {
        if !target.is_alive() {
            return false;
        }
        match self {
            Self::Opponents => !actor.is_allied_with(target),
            Self::AlliesExcludingSelf => actor.is_allied_with(target) && actor.id != target.id,
            Self::SelfOnly => actor.id == target.id,
        }
    }
}

/// Legal targets of `kind` for `actor`, in initiative order.
///
/// Returns an empty list if the actor is unknown.
pub fn legal_targets(
    session: &CombatSession,
    actor: &CombatantId,
    kind: ActionKind,
) -> Vec<CombatantId> {
    let Some(actor) = session.combatant(actor) else {
        return Vec::new();
    };
    let policy = kind.target_policy();

    session
        .combatants
        .iter()
        .filter(|candidate| policy.admits(actor, candidate))
        .map(|candidate| candidate.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Controller, UserId};
    use proptest::prelude::*;

    fn player(id: &str, hp: u32) -> Combatant {
        Combatant::new(
            CombatantId::new(id),
            id,
            20,
            Controller::Player {
                owner: UserId::new(id),
            },
        )
        .with_hp(hp)
    }

    fn enemy(index: usize, hp: u32) -> Combatant {
        Combatant::new(CombatantId::enemy(index), "Goblin", 20, Controller::Enemy).with_hp(hp)
    }

    fn session_from(hps: &[(bool, u32)]) -> CombatSession {
        let mut session = CombatSession::new("s", 1);
        for (index, (is_player, hp)) in hps.iter().enumerate() {
            let combatant = if *is_player {
                player(&format!("p{index}"), *hp)
            } else {
                enemy(index, *hp)
            };
            session.combatants.push(combatant);
        }
        session
    }

    fn ids(values: &[&str]) -> Vec<CombatantId> {
        values.iter().map(|v| CombatantId::new(*v)).collect()
    }

    #[test]
    fn player_targets_follow_the_table() {
        let session = session_from(&[(true, 10), (true, 10), (true, 0), (false, 10), (false, 0)]);
        let actor = CombatantId::new("p0");

        for kind in [ActionKind::Attack, ActionKind::Spell, ActionKind::Special] {
            assert_eq!(legal_targets(&session, &actor, kind), ids(&["enemy-3"]));
        }
        for kind in [ActionKind::Heal, ActionKind::Item, ActionKind::TeamUp] {
            assert_eq!(legal_targets(&session, &actor, kind), ids(&["p1"]));
        }
        for kind in [ActionKind::Defend, ActionKind::Environmental] {
            assert_eq!(legal_targets(&session, &actor, kind), ids(&["p0"]));
        }
    }

    #[test]
    fn enemy_targets_follow_the_table() {
        let session = session_from(&[(true, 10), (true, 0), (false, 10), (false, 10)]);
        let actor = CombatantId::new("enemy-2");

        assert_eq!(
            legal_targets(&session, &actor, ActionKind::Attack),
            ids(&["p0"])
        );
        assert_eq!(
            legal_targets(&session, &actor, ActionKind::Heal),
            ids(&["enemy-3"])
        );
        assert_eq!(
            legal_targets(&session, &actor, ActionKind::Defend),
            ids(&["enemy-2"])
        );
    }

    #[test]
    fn unknown_actor_has_no_targets() {
        let session = session_from(&[(true, 10), (false, 10)]);
        assert!(legal_targets(&session, &CombatantId::new("ghost"), ActionKind::Attack).is_empty());
    }

    proptest! {
        #[test]
        fn targets_always_satisfy_the_policy(
            roster in prop::collection::vec((any::<bool>(), 0u32..3), 1..8),
            actor_index in 0usize..8,
            kind_index in 0usize..ActionKind::ALL.len(),
        ) {
            let session = session_from(&roster);
            let actor = &session.combatants[actor_index % session.combatants.len()];
            let kind = ActionKind::ALL[kind_index];

            for id in legal_targets(&session, &actor.id, kind) {
                let target = session.combatant(&id).unwrap();
                prop_assert!(target.is_alive());
                match kind.target_policy() {
                    TargetPolicy::Opponents => prop_assert_ne!(actor.is_player(), target.is_player()),
                    TargetPolicy::AlliesExcludingSelf => {
                        prop_assert_eq!(actor.is_player(), target.is_player());
                        prop_assert_ne!(&actor.id, &target.id);
                    }
                    TargetPolicy::SelfOnly => prop_assert_eq!(&actor.id, &target.id),
                }
            }
        }
    }
}
