//! Action selection for non-player combatants.

use std::cmp::Reverse;

use async_trait::async_trait;
use combat_core::{
    ActionKind, ActionRequest, CombatSession, Combatant, CombatantId, available_actions,
    legal_targets,
};

use crate::api::{ActionProvider, Result, RuntimeError};

/// An action kind and the combatant it is aimed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub kind: ActionKind,
    pub target: CombatantId,
}

impl Decision {
    pub fn into_request(self, actor: CombatantId) -> ActionRequest {
        ActionRequest::new(actor, self.kind).with_target(self.target)
    }
}

/// Picks what `actor` does on its turn.
///
/// The highest-priority offensive kind that is off cooldown wins (catalog
/// order breaks ties) and is aimed at the living opponent with the least HP
/// (initiative order breaks ties). With nothing offensive usable the actor
/// defends. `None` means the turn should be passed.
pub fn choose_action(actor: &Combatant, session: &CombatSession) -> Option<Decision> {
    let mut available = available_actions(actor, session);
    available.sort_by_key(|kind| Reverse(kind.profile().priority));

    available
        .iter()
        .copied()
        .filter(|kind| kind.is_offensive())
        .find_map(|kind| {
            weakest(session, &legal_targets(session, &actor.id, kind))
                .map(|target| Decision { kind, target })
        })
        .or_else(|| {
            available
                .contains(&ActionKind::Defend)
                .then(|| Decision {
                    kind: ActionKind::Defend,
                    target: actor.id.clone(),
                })
        })
}

/// Candidate with the lowest current HP; the first one wins ties.
pub(crate) fn weakest(session: &CombatSession, candidates: &[CombatantId]) -> Option<CombatantId> {
    candidates
        .iter()
        .filter_map(|id| session.combatant(id))
        .min_by_key(|combatant| combatant.hp)
        .map(|combatant| combatant.id.clone())
}

/// Deterministic policy for enemy turns.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnemyPolicy;

#[async_trait]
impl ActionProvider for EnemyPolicy {
    async fn provide_action(
        &self,
        actor: &CombatantId,
        session: &CombatSession,
    ) -> Result<Option<ActionRequest>> {
        let combatant = session
            .combatant(actor)
            .ok_or_else(|| RuntimeError::Provider(format!("no combatant {actor} in session")))?;
        Ok(choose_action(combatant, session).map(|decision| decision.into_request(actor.clone())))
    }
}
