//! Normalization of party and enemy source records into combatants.

use std::collections::BTreeSet;

use crate::config::CombatConfig;

use super::combatant::{Combatant, CombatantId, Controller, UserId};

/// Party member stat block as read from the character source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyMemberRecord {
    /// Character id; falls back to the owner's id.
    pub id: Option<String>,
    pub owner: UserId,
    pub name: String,
    pub hp: Option<u32>,
    pub max_hp: Option<u32>,
    pub ac: Option<i32>,
    pub class: Option<String>,
    pub level: Option<u32>,
    pub strength: Option<u32>,
    pub dexterity: Option<u32>,
}

impl PartyMemberRecord {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: UserId::new(owner),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.hp = Some(hp);
        self.max_hp = Some(max_hp);
        self
    }

    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = Some(ac);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

/// Enemy stat block supplied by the encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyRecord {
    pub name: String,
    pub hp: Option<u32>,
    pub max_hp: Option<u32>,
    pub ac: Option<i32>,
    pub class: Option<String>,
    pub attack_bonus: Option<i32>,
}

impl EnemyRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.hp = Some(hp);
        self.max_hp = Some(max_hp);
        self
    }

    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = Some(ac);
        self
    }

    pub fn with_attack_bonus(mut self, attack_bonus: i32) -> Self {
        self.attack_bonus = Some(attack_bonus);
        self
    }
}

/// Merges party members and enemies into the initiative order.
///
/// Party members come first, in source order, followed by enemies. Absent
/// `hp`/`max_hp` fall back to `config.default_hp`, and `hp` is clamped into
/// `[0, max_hp]`.
pub fn normalize(
    party: &[PartyMemberRecord],
    enemies: &[EnemyRecord],
    config: &CombatConfig,
) -> Vec<Combatant> {
    let mut seen = BTreeSet::new();
    let mut combatants = Vec::with_capacity(party.len() + enemies.len());

    for member in party {
        let base = member
            .id
            .clone()
            .unwrap_or_else(|| member.owner.as_str().to_owned());
        let id = unique_id(&mut seen, base);
        let (hp, max_hp) = resolve_hp(member.hp, member.max_hp, config);

        let mut combatant = Combatant::new(
            id,
            member.name.clone(),
            max_hp,
            Controller::Player {
                owner: member.owner.clone(),
            },
        )
        .with_hp(hp)
        .with_ac(member.ac.unwrap_or(config.default_ac))
        .with_attack_bonus(party_attack_bonus(member));
        combatant.class = member.class.clone();

        combatants.push(combatant);
    }

    for (index, enemy) in enemies.iter().enumerate() {
        let id = unique_id(&mut seen, CombatantId::enemy(index).0);
        let (hp, max_hp) = resolve_hp(enemy.hp, enemy.max_hp, config);

        let mut combatant = Combatant::new(id, enemy.name.clone(), max_hp, Controller::Enemy)
            .with_hp(hp)
            .with_ac(enemy.ac.unwrap_or(config.default_ac))
            .with_attack_bonus(
                enemy
                    .attack_bonus
                    .unwrap_or(config.default_enemy_attack_bonus),
            );
        combatant.class = enemy.class.clone();

        combatants.push(combatant);
    }

    combatants
}

fn resolve_hp(hp: Option<u32>, max_hp: Option<u32>, config: &CombatConfig) -> (u32, u32) {
    let max_hp = max_hp.unwrap_or(config.default_hp).max(1);
    let hp = hp.unwrap_or(max_hp).min(max_hp);
    (hp, max_hp)
}

/// Proficiency from level plus the better of the STR/DEX modifiers.
fn party_attack_bonus(member: &PartyMemberRecord) -> i32 {
    let level = member.level.unwrap_or(1).max(1);
    let proficiency = i32::try_from((level - 1) / 4).map_or(i32::MAX, |p| p.saturating_add(2));
    let modifier = [member.strength, member.dexterity]
        .into_iter()
        .flatten()
        .map(ability_modifier)
        .max()
        .unwrap_or(0);
    proficiency.saturating_add(modifier)
}

fn ability_modifier(score: u32) -> i32 {
    i32::try_from((i64::from(score) - 10).div_euclid(2)).unwrap_or(i32::MAX)
}

fn unique_id(seen: &mut BTreeSet<String>, base: String) -> CombatantId {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    CombatantId::new(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamps_hp() {
        let config = CombatConfig::default();
        let party = [
            PartyMemberRecord::new("u1", "Brom"),
            PartyMemberRecord {
                hp: Some(40),
                max_hp: Some(25),
                ..PartyMemberRecord::new("u2", "Ilsa")
            },
        ];
        let enemies = [EnemyRecord::new("Goblin")];

        let combatants = normalize(&party, &enemies, &config);

        assert_eq!(combatants.len(), 3);
        assert_eq!((combatants[0].hp, combatants[0].max_hp), (10, 10));
        assert_eq!((combatants[1].hp, combatants[1].max_hp), (25, 25));
        assert_eq!((combatants[2].hp, combatants[2].max_hp), (10, 10));
    }

    #[test]
    fn assigns_identities_by_side() {
        let config = CombatConfig::default();
        let party = [PartyMemberRecord::new("u1", "Brom")];
        let enemies = [EnemyRecord::new("Goblin"), EnemyRecord::new("Orc")];

        let combatants = normalize(&party, &enemies, &config);

        assert_eq!(combatants[0].id.as_str(), "u1");
        assert_eq!(combatants[0].owner(), Some(&UserId::new("u1")));
        assert_eq!(combatants[1].id.as_str(), "enemy-0");
        assert_eq!(combatants[2].id.as_str(), "enemy-1");
        assert!(combatants[1].is_enemy() && combatants[2].is_enemy());
    }

    #[test]
    fn duplicate_owner_ids_are_disambiguated() {
        let config = CombatConfig::default();
        let party = [
            PartyMemberRecord::new("u1", "Brom"),
            PartyMemberRecord::new("u1", "Brom's hound"),
        ];

        let combatants = normalize(&party, &[], &config);
        assert_eq!(combatants[1].id.as_str(), "u1-2");
    }

    #[test]
    fn attack_bonus_uses_level_and_best_ability() {
        let member = PartyMemberRecord {
            strength: Some(16),
            dexterity: Some(12),
            ..PartyMemberRecord::new("u1", "Brom").with_level(5)
        };
        assert_eq!(party_attack_bonus(&member), 3 + 3);
        assert_eq!(ability_modifier(9), -1);
    }

    #[test]
    fn extreme_stat_blocks_saturate() {
        let member = PartyMemberRecord {
            strength: Some(u32::MAX),
            ..PartyMemberRecord::new("u1", "Titan").with_level(u32::MAX)
        };
        assert_eq!(party_attack_bonus(&member), i32::MAX);
        assert_eq!(ability_modifier(0), -5);
    }

    #[test]
    fn records_default_to_an_unowned_blank() {
        let record = PartyMemberRecord::default();
        assert_eq!(record.owner.as_str(), "");
        assert_eq!(record.hp, None);
    }
}
