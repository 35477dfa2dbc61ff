//! Static action catalog and class special abilities.

use crate::state::{Combatant, StatusEffectKind};

use super::ActionKind;
use super::targeting::TargetPolicy;

/// `count`d`sides` + `bonus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub bonus: u32,
}

impl Dice {
    pub const fn new(count: u32, sides: u32, bonus: u32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }
}

impl core::fmt::Display for Dice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.bonus == 0 {
            write!(f, "{}d{}", self.count, self.sides)
        } else {
            write!(f, "{}d{}+{}", self.count, self.sides, self.bonus)
        }
    }
}

/// Catalog entry for one action kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionProfile {
    pub kind: ActionKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Higher is preferred by the enemy policy.
    pub priority: u8,
    /// Supports `{character}`, `{target}`, `{ally}`, `{environment}` and `{ability}`.
    pub narrative_template: &'static str,
    /// Own turns the kind stays unavailable after use.
    pub cooldown: u32,
    pub target_policy: TargetPolicy,
    /// Damage or healing dice, if the kind rolls any.
    pub dice: Option<Dice>,
}

static ATTACK: ActionProfile = ActionProfile {
    kind: ActionKind::Attack,
    name: "Attack",
    description: "A basic weapon attack against one opponent.",
    priority: 1,
    narrative_template: "{character} strikes at {target}.",
    cooldown: 0,
    target_policy: TargetPolicy::Opponents,
    dice: Some(Dice::new(1, 8, 2)),
};

static HEAL: ActionProfile = ActionProfile {
    kind: ActionKind::Heal,
    name: "Heal",
    description: "Restore hit points to a wounded ally.",
    priority: 3,
    narrative_template: "{character} tends to {target}'s wounds.",
    cooldown: 2,
    target_policy: TargetPolicy::AlliesExcludingSelf,
    dice: Some(Dice::new(1, 8, 2)),
};

static DEFEND: ActionProfile = ActionProfile {
    kind: ActionKind::Defend,
    name: "Defend",
    description: "Raise your guard, gaining +2 AC until your next turn.",
    priority: 1,
    narrative_template: "{character} raises their guard.",
    cooldown: 1,
    target_policy: TargetPolicy::SelfOnly,
    dice: None,
};

static SPELL: ActionProfile = ActionProfile {
    kind: ActionKind::Spell,
    name: "Cast Spell",
    description: "A damaging spell that leaves the target weakened.",
    priority: 2,
    narrative_template: "{character} hurls a crackling spell at {target}.",
    cooldown: 2,
    target_policy: TargetPolicy::Opponents,
    dice: Some(Dice::new(2, 6, 0)),
};

static ITEM: ActionProfile = ActionProfile {
    kind: ActionKind::Item,
    name: "Use Item",
    description: "Share a draught that heals and blesses an ally.",
    priority: 2,
    narrative_template: "{character} hands {target} a restorative draught.",
    cooldown: 3,
    target_policy: TargetPolicy::AlliesExcludingSelf,
    dice: Some(Dice::new(1, 4, 2)),
};

static SPECIAL: ActionProfile = ActionProfile {
    kind: ActionKind::Special,
    name: "Special Ability",
    description: "Your class's signature technique.",
    priority: 4,
    narrative_template: "{character} unleashes {ability} against {target}.",
    cooldown: 3,
    target_policy: TargetPolicy::Opponents,
    dice: Some(Dice::new(1, 8, 2)),
};

static ENVIRONMENTAL: ActionProfile = ActionProfile {
    kind: ActionKind::Environmental,
    name: "Use Environment",
    description: "Turn the battlefield against every opponent at once.",
    priority: 3,
    narrative_template: "{character} turns {environment} against the enemy.",
    cooldown: 2,
    target_policy: TargetPolicy::SelfOnly,
    dice: Some(Dice::new(1, 6, 0)),
};

static TEAM_UP: ActionProfile = ActionProfile {
    kind: ActionKind::TeamUp,
    name: "Team Up",
    description: "Coordinate with an ally; both of you become inspired.",
    priority: 3,
    narrative_template: "{character} and {ally} coordinate their assault.",
    cooldown: 3,
    target_policy: TargetPolicy::AlliesExcludingSelf,
    dice: None,
};

/// Catalog entry for `kind`.
pub fn profile(kind: ActionKind) -> &'static ActionProfile {
    match kind {
        ActionKind::Attack => &ATTACK,
        ActionKind::Heal => &HEAL,
        ActionKind::Defend => &DEFEND,
        ActionKind::Spell => &SPELL,
        ActionKind::Item => &ITEM,
        ActionKind::Special => &SPECIAL,
        ActionKind::Environmental => &ENVIRONMENTAL,
        ActionKind::TeamUp => &TEAM_UP,
    }
}

/// Signature technique of a character class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialAbility {
    pub class: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cooldown: u32,
    /// Added on top of the special action's damage dice.
    pub bonus_damage: u32,
    /// Status placed on the target on hit.
    pub applies: Option<(StatusEffectKind, u32)>,
}

static SPECIAL_ABILITIES: [SpecialAbility; 6] = [
    SpecialAbility {
        class: "fighter",
        name: "Power Strike",
        description: "A crushing blow that trades finesse for force.",
        cooldown: 3,
        bonus_damage: 4,
        applies: None,
    },
    SpecialAbility {
        class: "wizard",
        name: "Arcane Surge",
        description: "Raw arcane energy that saps the target's strength.",
        cooldown: 3,
        bonus_damage: 3,
        applies: Some((StatusEffectKind::Weakened, 2)),
    },
    SpecialAbility {
        class: "cleric",
        name: "Divine Smite",
        description: "Radiant force that burns the unholy.",
        cooldown: 3,
        bonus_damage: 3,
        applies: None,
    },
    SpecialAbility {
        class: "rogue",
        name: "Sneak Attack",
        description: "A strike to an exposed weak point.",
        cooldown: 2,
        bonus_damage: 5,
        applies: None,
    },
    SpecialAbility {
        class: "ranger",
        name: "Hunter's Mark",
        description: "A marked shot that exposes the target to the whole party.",
        cooldown: 3,
        bonus_damage: 2,
        applies: Some((StatusEffectKind::Marked, 3)),
    },
    SpecialAbility {
        class: "paladin",
        name: "Lay Low",
        description: "A shield-bash that leaves the foe reeling.",
        cooldown: 3,
        bonus_damage: 2,
        applies: Some((StatusEffectKind::Weakened, 2)),
    },
];

/// Special ability for a class name, matched case-insensitively.
pub fn special_ability(class: &str) -> Option<&'static SpecialAbility> {
    let class = class.trim();
    SPECIAL_ABILITIES
        .iter()
        .find(|ability| ability.class.eq_ignore_ascii_case(class))
}

/// Special ability of a combatant's class, if it has one.
pub fn special_ability_of(combatant: &Combatant) -> Option<&'static SpecialAbility> {
    combatant.class.as_deref().and_then(special_ability)
}
