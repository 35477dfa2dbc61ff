//! Pre and post checks around action resolution.
//!
//! Pre-validation runs against the session before any mutation and resolves
//! the request into combatant indices. Post-validation checks the session
//! invariants after effects are applied.

use crate::action::available::is_available;
use crate::action::catalog::special_ability_of;
use crate::action::{ActionError, ActionKind, ActionRequest, TargetPolicy};
use crate::state::{CombatSession, CombatState};

/// Request resolved against the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Resolved {
    pub actor: usize,
    pub target: usize,
}

pub(super) fn pre_validate(
    session: &CombatSession,
    request: &ActionRequest,
) -> Result<Resolved, ActionError> {
    match session.combat_state {
        CombatState::Active => {}
        CombatState::Ended => return Err(ActionError::CombatEnded),
        other => return Err(ActionError::CombatNotActive(other)),
    }
    if session.readiness.is_pending() {
        return Err(ActionError::ReadinessPending);
    }

    let actor_index = session
        .index_of(&request.actor)
        .ok_or_else(|| ActionError::ActorNotFound(request.actor.clone()))?;
    if actor_index != session.current_turn {
        return Err(ActionError::NotActorsTurn {
            actor: request.actor.clone(),
            current: session.current_combatant().map(|c| c.id.clone()),
        });
    }

    let actor = &session.combatants[actor_index];
    if !actor.is_alive() {
        return Err(ActionError::ActorDead(actor.id.clone()));
    }

    let remaining = actor.cooldown(request.kind);
    if remaining > 0 {
        return Err(ActionError::OnCooldown {
            kind: request.kind,
            remaining,
        });
    }
    if !is_available(actor, session, request.kind) {
        return Err(ActionError::ActionNotAvailable(request.kind));
    }

    let policy = request.kind.target_policy();
    let target_index = match (&request.target, policy) {
        (None, TargetPolicy::SelfOnly) => actor_index,
        (None, _) => return Err(ActionError::TargetRequired(request.kind)),
        (Some(id), _) => session
            .index_of(id)
            .ok_or_else(|| ActionError::TargetNotFound(id.clone()))?,
    };

    let target = &session.combatants[target_index];
    if !policy.admits(actor, target) {
        return Err(ActionError::InvalidTarget {
            kind: request.kind,
            target: target.id.clone(),
        });
    }

    Ok(Resolved {
        actor: actor_index,
        target: target_index,
    })
}

pub(super) fn post_validate(session: &CombatSession) -> Result<(), ActionError> {
    if session.current_turn >= session.combatants.len() {
        return Err(ActionError::Inconsistent(format!(
            "current turn {} outside roster of {}",
            session.current_turn,
            session.combatants.len()
        )));
    }
    if let Some(combatant) = session.combatants.iter().find(|c| c.hp > c.max_hp) {
        return Err(ActionError::Inconsistent(format!(
            "{} has {} of {} hp",
            combatant.id, combatant.hp, combatant.max_hp
        )));
    }
    Ok(())
}

/// Cooldown set on the actor after using `kind`.
pub(super) fn cooldown_for(session: &CombatSession, actor: usize, kind: ActionKind) -> u32 {
    match kind {
        ActionKind::Special => special_ability_of(&session.combatants[actor])
            .map_or(kind.profile().cooldown, |ability| ability.cooldown),
        _ => kind.profile().cooldown,
    }
}
