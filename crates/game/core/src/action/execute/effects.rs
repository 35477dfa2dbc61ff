//! Session mutations shared by every action kind.
//!
//! Each helper mutates one combatant, records the change in the outcome and
//! appends the matching battle-log line.

use crate::action::{ActionOutcome, AppliedStatus};
use crate::state::{CombatSession, LogKind, StatusEffectKind};

/// Removes HP from the combatant at `index`, logging a death if it drops to 0.
pub(super) fn deal_damage(
    session: &mut CombatSession,
    index: usize,
    amount: u32,
    timestamp: u64,
    outcome: &mut ActionOutcome,
) {
    let target = &mut session.combatants[index];
    let was_alive = target.is_alive();
    let lost = target.apply_damage(amount);
    let line = format!(
        "{} takes {} damage ({}/{} HP).",
        target.name, lost, target.hp, target.max_hp
    );
    let died = was_alive && !target.is_alive();
    let (id, name) = (target.id.clone(), target.name.clone());

    outcome.damage += lost;
    session.log(LogKind::Damage, timestamp, line);

    if died {
        outcome.target_died = true;
        outcome.defeated.push(id);
        session.log(LogKind::Death, timestamp, format!("{name} falls!"));
    }
}

pub(super) fn restore_health(
    session: &mut CombatSession,
    index: usize,
    amount: u32,
    timestamp: u64,
    outcome: &mut ActionOutcome,
) {
    let target = &mut session.combatants[index];
    let gained = target.apply_healing(amount);
    let line = format!(
        "{} recovers {} HP ({}/{} HP).",
        target.name, gained, target.hp, target.max_hp
    );

    outcome.healing += gained;
    session.log(LogKind::Healing, timestamp, line);
}

/// Places a status on a living combatant. Full status lists drop the effect.
pub(super) fn apply_status(
    session: &mut CombatSession,
    index: usize,
    kind: StatusEffectKind,
    duration: u32,
    timestamp: u64,
    outcome: &mut ActionOutcome,
) {
    let target = &mut session.combatants[index];
    if !target.is_alive() || !target.status_effects.add(kind, duration) {
        return;
    }
    let line = format!("{} {}.", target.name, kind.describe());

    outcome.status_effects.push(AppliedStatus {
        target: target.id.clone(),
        kind,
        duration,
    });
    session.log(LogKind::StatusEffect, timestamp, line);
}
