//! Action resolution pipeline.
//!
//! 1. **Pre-validation**: combat active, barrier lowered, actor on turn and
//!    alive, kind available, target admitted by the policy
//! 2. **Apply**: tick the actor's timers, set the new cooldown, narrate, roll
//!    and mutate combatants
//! 3. **Post-validation**: session invariants still hold
//!
//! Resolution never advances the turn; the engine does that after a
//! successful resolution.

mod effects;
mod formula;
mod validation;

use crate::action::catalog::special_ability_of;
use crate::action::narrative::{NarrativeTokens, render};
use crate::action::{ActionError, ActionKind, ActionOutcome, ActionRequest};
use crate::env::CombatEnv;
use crate::state::{CombatSession, LogKind, StatusEffectKind};

use formula::Roller;
use validation::Resolved;

const SPELL_WEAKEN_TURNS: u32 = 2;
const ITEM_BLESS_TURNS: u32 = 2;
const DEFEND_TURNS: u32 = 1;
const TEAM_UP_TURNS: u32 = 2;

/// Validates `request` and applies it to `session`.
///
/// On error the session may be partially mutated; callers stage on a clone.
pub(crate) fn resolve(
    session: &mut CombatSession,
    env: &CombatEnv<'_>,
    request: &ActionRequest,
) -> Result<ActionOutcome, ActionError> {
    let resolved = validation::pre_validate(session, request)?;
    let timestamp = env.now_millis();

    let cooldown = validation::cooldown_for(session, resolved.actor, request.kind);
    let actor = &mut session.combatants[resolved.actor];
    actor.tick_own_turn();
    actor.set_cooldown(request.kind, cooldown);

    let mut outcome = ActionOutcome {
        narrative: narrate(session, resolved, request),
        ..ActionOutcome::default()
    };
    session.log(LogKind::Action, timestamp, outcome.narrative.clone());

    let roller = Roller::new(env.rng(), session);
    let mut step = Step {
        session: &mut *session,
        roller: &roller,
        resolved,
        request,
        timestamp,
        outcome: &mut outcome,
    };
    match request.kind {
        ActionKind::Attack | ActionKind::Spell | ActionKind::Special => step.strike(),
        ActionKind::Heal | ActionKind::Item => step.mend(),
        ActionKind::Defend => step.defend(),
        ActionKind::Environmental => step.sweep(),
        ActionKind::TeamUp => step.team_up(),
    }

    validation::post_validate(session)?;
    Ok(outcome)
}

fn narrate(session: &CombatSession, resolved: Resolved, request: &ActionRequest) -> String {
    let actor = &session.combatants[resolved.actor];
    let target = &session.combatants[resolved.target];
    let extra = &request.extra;

    let tokens = NarrativeTokens {
        character: &actor.name,
        target: Some(&target.name),
        ally: extra.ally.as_deref().or(Some(target.name.as_str())),
        environment: extra
            .environment
            .as_deref()
            .or_else(|| session.environmental_features.first().map(String::as_str)),
        ability: extra
            .ability
            .as_deref()
            .or_else(|| special_ability_of(actor).map(|ability| ability.name)),
    };
    render(request.kind.profile().narrative_template, &tokens)
}

/// Borrowed state for applying one resolved request.
struct Step<'s, 'r> {
    session: &'s mut CombatSession,
    roller: &'r Roller<'r>,
    resolved: Resolved,
    request: &'r ActionRequest,
    timestamp: u64,
    outcome: &'s mut ActionOutcome,
}

impl Step<'_, '_> {
    fn status(&mut self, index: usize, kind: StatusEffectKind, duration: u32) {
        effects::apply_status(
            self.session,
            index,
            kind,
            duration,
            self.timestamp,
            self.outcome,
        );
    }

    /// Attack, spell and special: d20 against AC, then damage on a hit.
    fn strike(&mut self) {
        let kind = self.request.kind;
        let rolls = self.request.extra.rolls;
        let actor = &self.session.combatants[self.resolved.actor];
        let target = &self.session.combatants[self.resolved.target];

        let ability = match kind {
            ActionKind::Special => special_ability_of(actor),
            _ => None,
        };
        let modifier = actor
            .attack_bonus
            .saturating_add(actor.status_effects.attack_roll_bonus())
            .saturating_add(target.status_effects.exposure_bonus());
        let natural = self.roller.d20(rolls.attack);
        let roll = formula::attack_roll(natural, modifier, target.effective_ac());

        self.outcome.hit = roll.hit;
        self.outcome.critical = roll.critical;

        if !roll.hit {
            self.outcome.description = format!(
                "{} rolls {} ({} total) against AC {} and misses {}.",
                actor.name, roll.natural, roll.total, roll.target_ac, target.name
            );
            let line = self.outcome.description.clone();
            self.session.log(LogKind::Miss, self.timestamp, line);
            return;
        }

        let amount = match rolls.damage {
            Some(fixed) => fixed,
            None => {
                let base = kind
                    .profile()
                    .dice
                    .map_or(0, |dice| self.roller.amount(dice, 0));
                let bonus = actor.status_effects.damage_bonus()
                    + ability.map_or(0, |ability| ability.bonus_damage);
                let weakened = actor.status_effects.is_weakened();
                formula::scale_damage(base + bonus, roll.critical, weakened)
            }
        };
        self.outcome.description = format!(
            "{} rolls {} ({} total) against AC {}{} and hits {} for {} damage.",
            actor.name,
            roll.natural,
            roll.total,
            roll.target_ac,
            if roll.critical { ", a critical hit," } else { "" },
            target.name,
            amount
        );

        let target = self.resolved.target;
        effects::deal_damage(self.session, target, amount, self.timestamp, self.outcome);

        match kind {
            ActionKind::Spell => {
                self.status(target, StatusEffectKind::Weakened, SPELL_WEAKEN_TURNS)
            }
            ActionKind::Special => {
                if let Some((status, duration)) = ability.and_then(|ability| ability.applies) {
                    self.status(target, status, duration);
                }
            }
            _ => {}
        }
    }

    /// Heal and item: restore HP; items also bless.
    fn mend(&mut self) {
        let target = self.resolved.target;
        let amount = match self.request.extra.rolls.damage {
            Some(fixed) => fixed,
            None => self
                .request
                .kind
                .profile()
                .dice
                .map_or(0, |dice| self.roller.amount(dice, 0)),
        };

        effects::restore_health(self.session, target, amount, self.timestamp, self.outcome);
        if self.request.kind == ActionKind::Item {
            self.status(target, StatusEffectKind::Blessed, ITEM_BLESS_TURNS);
        }

        let target = &self.session.combatants[target];
        self.outcome.description = format!("{} recovers {} HP.", target.name, self.outcome.healing);
    }

    fn defend(&mut self) {
        let actor = self.resolved.actor;
        self.status(actor, StatusEffectKind::Defending, DEFEND_TURNS);
        self.outcome.description = format!(
            "{} gains +2 AC until their next turn.",
            self.session.combatants[actor].name
        );
    }

    /// Environmental: unopposed damage to every living opponent.
    fn sweep(&mut self) {
        let actor = &self.session.combatants[self.resolved.actor];
        let weakened = actor.status_effects.is_weakened();
        let bonus = actor.status_effects.damage_bonus();
        let name = actor.name.clone();

        let victims: Vec<usize> = self
            .session
            .combatants
            .iter()
            .enumerate()
            .filter(|(_, other)| other.is_alive() && !actor.is_allied_with(other))
            .map(|(index, _)| index)
            .collect();

        for (slot, index) in victims.iter().copied().enumerate() {
            let amount = match self.request.extra.rolls.damage {
                Some(fixed) => fixed,
                None => {
                    let base = self
                        .request
                        .kind
                        .profile()
                        .dice
                        .map_or(0, |dice| self.roller.amount(dice, slot as u32));
                    formula::scale_damage(base + bonus, false, weakened)
                }
            };
            effects::deal_damage(self.session, index, amount, self.timestamp, self.outcome);
        }

        self.outcome.hit = !victims.is_empty();
        self.outcome.description = format!(
            "{} deals {} damage across {} opponent(s).",
            name,
            self.outcome.damage,
            victims.len()
        );
    }

    /// Team-up: actor and ally both become inspired.
    fn team_up(&mut self) {
        let (actor, ally) = (self.resolved.actor, self.resolved.target);
        self.status(actor, StatusEffectKind::Inspired, TEAM_UP_TURNS);
        self.status(ally, StatusEffectKind::Inspired, TEAM_UP_TURNS);
        self.outcome.description = format!(
            "{} and {} are inspired.",
            self.session.combatants[actor].name, self.session.combatants[ally].name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionExtra;
    use crate::state::{Combatant, CombatantId, CombatState, Controller, UserId};

    fn player(id: &str, hp: u32) -> Combatant {
        Combatant::new(
            CombatantId::new(id),
            id.to_uppercase(),
            30,
            Controller::Player {
                owner: UserId::new(id),
            },
        )
        .with_hp(hp)
        .with_attack_bonus(3)
    }

    fn goblin(index: usize, hp: u32) -> Combatant {
        Combatant::new(CombatantId::enemy(index), "Goblin", 12, Controller::Enemy)
            .with_hp(hp)
            .with_ac(12)
    }

    fn active(combatants: Vec<Combatant>) -> CombatSession {
        let mut session = CombatSession::new("s", 7);
        session.combatants = combatants;
        session.combat_state = CombatState::Active;
        session
    }

    fn attack(actor: &str, target: &str) -> ActionRequest {
        ActionRequest::new(CombatantId::new(actor), ActionKind::Attack)
            .with_target(CombatantId::new(target))
    }

    #[test]
    fn rejects_requests_out_of_turn() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        let env = CombatEnv::deterministic();

        let error = resolve(&mut session, &env, &attack("enemy-1", "a")).unwrap_err();
        assert_eq!(
            error,
            ActionError::NotActorsTurn {
                actor: CombatantId::new("enemy-1"),
                current: Some(CombatantId::new("a")),
            }
        );
    }

    #[test]
    fn rejects_illegal_targets() {
        let mut session = active(vec![player("a", 30), player("b", 30), goblin(2, 12)]);
        let env = CombatEnv::deterministic();

        let error = resolve(&mut session, &env, &attack("a", "b")).unwrap_err();
        assert!(matches!(error, ActionError::InvalidTarget { .. }));

        let heal = ActionRequest::new(CombatantId::new("a"), ActionKind::Heal);
        assert_eq!(
            resolve(&mut session, &env, &heal).unwrap_err(),
            ActionError::TargetRequired(ActionKind::Heal)
        );
    }

    #[test]
    fn readiness_barrier_blocks_resolution() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        session.readiness.raise();

        let error = resolve(&mut session, &CombatEnv::deterministic(), &attack("a", "enemy-1"));
        assert_eq!(error.unwrap_err(), ActionError::ReadinessPending);
    }

    #[test]
    fn overridden_hit_applies_exact_damage() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        let request = attack("a", "enemy-1").with_rolls(Some(15), Some(5));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert!(outcome.hit);
        assert_eq!(outcome.damage, 5);
        assert_eq!(session.combatants[1].hp, 7);
        assert_eq!(session.battle_log.entries()[0].kind, LogKind::Action);
        assert_eq!(session.battle_log.entries()[0].description, "A strikes at Goblin.");
    }

    #[test]
    fn natural_one_misses_and_logs() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        let request = attack("a", "enemy-1").with_rolls(Some(1), Some(50));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert!(!outcome.hit);
        assert_eq!(outcome.damage, 0);
        assert_eq!(session.combatants[1].hp, 12);
        assert!(session.battle_log.iter().any(|e| e.kind == LogKind::Miss));
    }

    #[test]
    fn lethal_damage_is_clamped_and_logs_death() {
        let mut session = active(vec![player("a", 30), goblin(1, 4)]);
        let request = attack("a", "enemy-1").with_rolls(Some(20), Some(40));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert!(outcome.critical && outcome.target_died);
        assert_eq!(outcome.damage, 4);
        assert_eq!(session.combatants[1].hp, 0);
        assert_eq!(outcome.defeated, vec![CombatantId::enemy(1)]);
        assert!(session.battle_log.iter().any(|e| e.kind == LogKind::Death));
    }

    #[test]
    fn healing_is_clamped_and_sets_cooldown() {
        let mut session = active(vec![player("a", 30), player("b", 25), goblin(2, 12)]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Heal)
            .with_target(CombatantId::new("b"))
            .with_rolls(None, Some(12));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert_eq!(outcome.healing, 5);
        assert_eq!(session.combatants[1].hp, 30);
        assert_eq!(session.combatants[0].cooldown(ActionKind::Heal), 2);
    }

    #[test]
    fn cooldown_blocks_the_next_own_turns() {
        let mut session = active(vec![player("a", 30), player("b", 20), goblin(2, 12)]);
        session.combatants[0].set_cooldown(ActionKind::Heal, 1);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Heal)
            .with_target(CombatantId::new("b"));

        assert_eq!(
            resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap_err(),
            ActionError::OnCooldown {
                kind: ActionKind::Heal,
                remaining: 1,
            }
        );
    }

    #[test]
    fn defend_defaults_to_self_and_raises_ac() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Defend);

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert_eq!(outcome.status_effects.len(), 1);
        assert_eq!(session.combatants[0].effective_ac(), 12);
        assert_eq!(session.combatants[0].cooldown(ActionKind::Defend), 1);
    }

    #[test]
    fn item_heals_and_blesses() {
        let mut session = active(vec![player("a", 30), player("b", 10), goblin(2, 12)]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Item)
            .with_target(CombatantId::new("b"));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert!((3..=6).contains(&outcome.healing));
        assert!(session.combatants[1].status_effects.has(StatusEffectKind::Blessed));
    }

    #[test]
    fn environmental_hits_every_living_opponent() {
        let mut session = active(vec![player("a", 30), goblin(1, 12), goblin(2, 12), goblin(3, 0)])
            .with_environmental_features(vec!["the rotten bridge".into()]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Environmental)
            .with_rolls(None, Some(3));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert_eq!(outcome.damage, 6);
        assert_eq!(session.combatants[1].hp, 9);
        assert_eq!(session.combatants[2].hp, 9);
        assert_eq!(
            outcome.narrative,
            "A turns the rotten bridge against the enemy."
        );
    }

    #[test]
    fn team_up_inspires_both_and_names_the_ally() {
        let mut session = active(vec![player("a", 30), player("b", 30), goblin(2, 12)])
            .with_team_up_opportunities(vec!["pincer".into()]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::TeamUp)
            .with_target(CombatantId::new("b"));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert_eq!(outcome.narrative, "A and B coordinate their assault.");
        assert!(session.combatants[0].status_effects.has(StatusEffectKind::Inspired));
        assert!(session.combatants[1].status_effects.has(StatusEffectKind::Inspired));
    }

    #[test]
    fn special_uses_class_ability_and_status() {
        let ranger = player("a", 30).with_class("Ranger");
        let mut session = active(vec![ranger, goblin(1, 12)]);
        let request = ActionRequest::new(CombatantId::new("a"), ActionKind::Special)
            .with_target(CombatantId::enemy(1))
            .with_rolls(Some(18), Some(2));

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();

        assert_eq!(outcome.narrative, "A unleashes Hunter's Mark against Goblin.");
        assert!(session.combatants[1].status_effects.has(StatusEffectKind::Marked));
        assert_eq!(session.combatants[0].cooldown(ActionKind::Special), 3);
    }

    #[test]
    fn extra_names_override_narration_defaults() {
        let mut session = active(vec![player("a", 30), goblin(1, 12)]);
        let request = attack("a", "enemy-1").with_extra(ActionExtra {
            ability: Some("unused".into()),
            ..ActionExtra::default()
        });

        let outcome = resolve(&mut session, &CombatEnv::deterministic(), &request).unwrap();
        assert_eq!(outcome.narrative, "A strikes at Goblin.");
    }
}
