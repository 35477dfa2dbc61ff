//! Uniform combatant record shared by party members and enemies.

use std::collections::BTreeMap;
use std::fmt;

use crate::action::ActionKind;

use super::status::StatusEffects;

/// Prefix carried by enemy identities so they never collide with player ids.
pub const ENEMY_ID_PREFIX: &str = "enemy-";

/// Stable identity of a combatant within one encounter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CombatantId(pub String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic identity for the enemy at `index` in the source list.
    pub fn enemy(index: usize) -> Self {
        Self(format!("{ENEMY_ID_PREFIX}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identity of a human user (owner of one or more party members).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Who drives a combatant's decisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "side", rename_all = "snake_case")
)]
pub enum Controller {
    /// Party member commanded by a user.
    Player { owner: UserId },
    /// Non-player combatant driven by the enemy policy.
    Enemy,
}

/// A participant in an encounter.
///
/// Combatants are never removed from the session, even at 0 HP, so indices
/// into the initiative order stay stable for the whole encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub ac: i32,
    pub attack_bonus: i32,
    pub class: Option<String>,
    pub controller: Controller,
    /// Remaining own turns before an action kind is usable again.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldowns: BTreeMap<ActionKind, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_effects: StatusEffects,
}

impl Combatant {
    /// Creates a combatant at full health with no cooldowns or effects.
    pub fn new(id: CombatantId, name: impl Into<String>, max_hp: u32, controller: Controller) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            id,
            name: name.into(),
            hp: max_hp,
            max_hp,
            ac: 10,
            attack_bonus: 0,
            class: None,
            controller,
            cooldowns: BTreeMap::new(),
            status_effects: StatusEffects::empty(),
        }
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = ac;
        self
    }

    pub fn with_attack_bonus(mut self, attack_bonus: i32) -> Self {
        self.attack_bonus = attack_bonus;
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_player(&self) -> bool {
        matches!(self.controller, Controller::Player { .. })
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.controller, Controller::Enemy)
    }

    /// Owner of a party member; `None` for enemies.
    pub fn owner(&self) -> Option<&UserId> {
        match &self.controller {
            Controller::Player { owner } => Some(owner),
            Controller::Enemy => None,
        }
    }

    /// True when both combatants fight on the same side.
    pub fn is_allied_with(&self, other: &Combatant) -> bool {
        self.is_player() == other.is_player()
    }

    pub fn cooldown(&self, kind: ActionKind) -> u32 {
        self.cooldowns.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, kind: ActionKind) -> bool {
        self.cooldown(kind) == 0
    }

    /// Armor class including defensive status effects.
    pub fn effective_ac(&self) -> i32 {
        self.ac.saturating_add(self.status_effects.ac_bonus())
    }

    /// Applies damage clamped at zero HP and returns the amount actually lost.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Applies healing clamped at `max_hp` and returns the amount actually gained.
    pub fn apply_healing(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_hp - self.hp.min(self.max_hp));
        self.hp = (self.hp + gained).min(self.max_hp);
        gained
    }

    /// Advances this combatant's own-turn timers by one.
    ///
    /// Cooldowns and status durations that reach zero are dropped.
    pub fn tick_own_turn(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
        self.status_effects.tick();
    }

    pub fn set_cooldown(&mut self, kind: ActionKind, turns: u32) {
        if turns == 0 {
            self.cooldowns.remove(&kind);
        } else {
            self.cooldowns.insert(kind, turns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> Combatant {
        Combatant::new(
            CombatantId::new("p1"),
            "Brom",
            20,
            Controller::Player {
                owner: UserId::new("u1"),
            },
        )
    }

    #[test]
    fn damage_and_healing_are_clamped() {
        let mut combatant = fighter().with_hp(5);

        assert_eq!(combatant.apply_damage(8), 5);
        assert_eq!(combatant.hp, 0);
        assert!(!combatant.is_alive());

        assert_eq!(combatant.apply_healing(50), 20);
        assert_eq!(combatant.hp, 20);
    }

    #[test]
    fn cooldowns_tick_down_and_clear() {
        let mut combatant = fighter();
        combatant.set_cooldown(ActionKind::Heal, 2);
        assert!(!combatant.is_ready(ActionKind::Heal));

        combatant.tick_own_turn();
        assert_eq!(combatant.cooldown(ActionKind::Heal), 1);

        combatant.tick_own_turn();
        assert!(combatant.is_ready(ActionKind::Heal));
        assert!(combatant.cooldowns.is_empty());
    }

    #[test]
    fn zero_max_hp_is_raised() {
        let combatant = Combatant::new(CombatantId::enemy(0), "Wisp", 0, Controller::Enemy);
        assert_eq!(combatant.max_hp, 1);
        assert_eq!(combatant.id.as_str(), "enemy-0");
    }
}
