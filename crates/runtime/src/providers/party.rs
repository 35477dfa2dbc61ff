//! Autopilot for party members.

use async_trait::async_trait;
use combat_core::{
    ActionKind, ActionRequest, CombatSession, Combatant, CombatantId, is_available, legal_targets,
};

use super::enemy::{choose_action, weakest};
use crate::api::{ActionProvider, Result, RuntimeError};

/// Plays a user's characters without input.
///
/// Heals the most wounded ally once one drops to `heal_below_percent` of
/// their maximum HP; otherwise fights like an enemy would.
#[derive(Clone, Copy, Debug)]
pub struct PartyPolicy {
    pub heal_below_percent: u32,
}

impl Default for PartyPolicy {
    fn default() -> Self {
        Self {
            heal_below_percent: 50,
        }
    }
}

impl PartyPolicy {
    fn wounded_ally(&self, actor: &Combatant, session: &CombatSession) -> Option<CombatantId> {
        if !is_available(actor, session, ActionKind::Heal) {
            return None;
        }
        let wounded: Vec<CombatantId> = legal_targets(session, &actor.id, ActionKind::Heal)
            .into_iter()
            .filter(|id| {
                session.combatant(id).is_some_and(|ally| {
                    u64::from(ally.hp) * 100
                        < u64::from(ally.max_hp) * u64::from(self.heal_below_percent)
                })
            })
            .collect();
        weakest(session, &wounded)
    }
}

#[async_trait]
impl ActionProvider for PartyPolicy {
    async fn provide_action(
        &self,
        actor: &CombatantId,
        session: &CombatSession,
    ) -> Result<Option<ActionRequest>> {
        let combatant = session
            .combatant(actor)
            .ok_or_else(|| RuntimeError::Provider(format!("no combatant {actor} in session")))?;

        if let Some(ally) = self.wounded_ally(combatant, session) {
            return Ok(Some(
                ActionRequest::new(actor.clone(), ActionKind::Heal).with_target(ally),
            ));
        }

        Ok(choose_action(combatant, session).map(|decision| decision.into_request(actor.clone())))
    }
}
