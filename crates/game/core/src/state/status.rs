//! Status effect system for combatants.
//!
//! Durations are counted in the holder's own turns: every time the holder
//! acts, each effect's remaining duration drops by one and expired effects
//! are removed.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

/// Active status effects on a combatant, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { CombatConfig::MAX_STATUS_EFFECTS }>,
}

/// A single status effect with its remaining duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    pub remaining: u32,
}

/// Types of status effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusEffectKind {
    // ========================================================================
    // Buffs
    // ========================================================================
    /// +2 armor class.
    Defending,

    /// +2 to attack rolls.
    Blessed,

    /// +2 to attack rolls and +2 damage.
    Inspired,

    // ========================================================================
    // Debuffs
    // ========================================================================
    /// Outgoing damage halved.
    Weakened,

    /// Attacks against the holder gain +2 to hit.
    Marked,
}

impl StatusEffectKind {
    /// Present-tense verb phrase used in battle-log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Defending => "is defending",
            Self::Blessed => "is blessed",
            Self::Inspired => "is inspired",
            Self::Weakened => "is weakened",
            Self::Marked => "is marked",
        }
    }
}

impl StatusEffects {
    /// Creates an empty status effect set.
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Checks if a specific status effect is active.
    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind && e.remaining > 0)
    }

    /// Remaining duration of an effect, if active.
    pub fn remaining(&self, kind: StatusEffectKind) -> Option<u32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind && e.remaining > 0)
            .map(|e| e.remaining)
    }

    /// Adds a status effect.
    ///
    /// If the effect already exists, extends to the longer duration. When the
    /// set is full the effect is dropped and `false` is returned.
    pub fn add(&mut self, kind: StatusEffectKind, duration: u32) -> bool {
        if duration == 0 {
            return false;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.remaining = existing.remaining.max(duration);
            return true;
        }

        self.effects
            .try_push(StatusEffect {
                kind,
                remaining: duration,
            })
            .is_ok()
    }

    /// Decrements every duration by one and drops expired effects.
    pub fn tick(&mut self) {
        for effect in self.effects.iter_mut() {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        self.effects.retain(|e| e.remaining > 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    // ===== derived modifiers =====

    pub fn ac_bonus(&self) -> i32 {
        if self.has(StatusEffectKind::Defending) {
            2
        } else {
            0
        }
    }

    pub fn attack_roll_bonus(&self) -> i32 {
        if self.has(StatusEffectKind::Blessed) || self.has(StatusEffectKind::Inspired) {
            2
        } else {
            0
        }
    }

    pub fn damage_bonus(&self) -> u32 {
        if self.has(StatusEffectKind::Inspired) {
            2
        } else {
            0
        }
    }

    /// Bonus granted to attackers targeting the holder.
    pub fn exposure_bonus(&self) -> i32 {
        if self.has(StatusEffectKind::Marked) {
            2
        } else {
            0
        }
    }

    pub fn is_weakened(&self) -> bool {
        self.has(StatusEffectKind::Weakened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_extends_existing_duration() {
        let mut effects = StatusEffects::empty();
        effects.add(StatusEffectKind::Blessed, 1);
        effects.add(StatusEffectKind::Blessed, 3);
        effects.add(StatusEffectKind::Blessed, 2);

        assert_eq!(effects.len(), 1);
        assert_eq!(effects.remaining(StatusEffectKind::Blessed), Some(3));
    }

    #[test]
    fn tick_expires_effects_in_order() {
        let mut effects = StatusEffects::empty();
        effects.add(StatusEffectKind::Defending, 1);
        effects.add(StatusEffectKind::Weakened, 2);

        effects.tick();
        assert!(!effects.has(StatusEffectKind::Defending));
        assert!(effects.has(StatusEffectKind::Weakened));

        effects.tick();
        assert!(effects.is_empty());
    }

    #[test]
    fn capacity_is_bounded() {
        let mut effects = StatusEffects::empty();
        let kinds = [
            StatusEffectKind::Defending,
            StatusEffectKind::Blessed,
            StatusEffectKind::Inspired,
            StatusEffectKind::Weakened,
            StatusEffectKind::Marked,
        ];
        for kind in kinds {
            assert!(effects.add(kind, 2));
        }
        assert!(effects.len() <= CombatConfig::MAX_STATUS_EFFECTS);
        assert_eq!(effects.ac_bonus(), 2);
        assert_eq!(effects.attack_roll_bonus(), 2);
        assert_eq!(effects.damage_bonus(), 2);
        assert_eq!(effects.exposure_bonus(), 2);
    }
}
