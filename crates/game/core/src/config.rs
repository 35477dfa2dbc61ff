/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// HP assigned to source records that omit `hp` or `max_hp`.
    pub default_hp: u32,

    /// Attack bonus for enemy records that do not declare one.
    pub default_enemy_attack_bonus: i32,

    /// Armor class for source records that omit it.
    pub default_ac: i32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HP: u32 = 10;
    pub const DEFAULT_ENEMY_ATTACK_BONUS: i32 = 2;
    pub const DEFAULT_AC: i32 = 10;

    pub fn new() -> Self {
        Self {
            default_hp: Self::DEFAULT_HP,
            default_enemy_attack_bonus: Self::DEFAULT_ENEMY_ATTACK_BONUS,
            default_ac: Self::DEFAULT_AC,
        }
    }

    pub fn with_default_hp(default_hp: u32) -> Self {
        Self {
            default_hp: default_hp.max(1),
            ..Self::new()
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
