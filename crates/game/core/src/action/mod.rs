//! Action domain.
//!
//! # Module Structure
//!
//! - `catalog`: static per-kind metadata and class special abilities
//! - `available`: which kinds a combatant may use right now
//! - `targeting`: relative target policies and legal-target listing
//! - `narrative`: template token substitution
//! - `execute`: validation and resolution of a single action
//! - `error`: [`ActionError`]

mod available;
mod catalog;
mod error;
pub(crate) mod execute;
mod narrative;
mod targeting;

pub use available::{available_actions, is_available};
pub use catalog::{
    ActionProfile, Dice, SpecialAbility, profile, special_ability, special_ability_of,
};
pub use error::ActionError;
pub use narrative::{NarrativeTokens, render};
pub use targeting::{TargetPolicy, legal_targets};

use crate::state::{CombatResult, CombatantId, StatusEffectKind};

/// Every action type a combatant can take.
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
pub enum ActionKind {
    Attack,
    Heal,
    Defend,
    Spell,
    Item,
    Special,
    Environmental,
    TeamUp,
}

impl ActionKind {
    /// Catalog order.
    pub const ALL: [ActionKind; 8] = [
        Self::Attack,
        Self::Heal,
        Self::Defend,
        Self::Spell,
        Self::Item,
        Self::Special,
        Self::Environmental,
        Self::TeamUp,
    ];

    pub fn profile(self) -> &'static ActionProfile {
        profile(self)
    }

    /// Kinds that roll to hit against an opponent.
    pub fn is_offensive(self) -> bool {
        matches!(self, Self::Attack | Self::Spell | Self::Special)
    }

    pub fn target_policy(self) -> TargetPolicy {
        self.profile().target_policy
    }
}

/// Dice results chosen by the player instead of the session seed.
///
/// Lets a table that rolls physical dice feed its results in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollOverrides {
    /// Natural d20 result; clamped to 1..=20.
    pub attack: Option<u32>,
    /// Final damage or healing amount before clamping to HP bounds.
    pub damage: Option<u32>,
}

/// Optional narration inputs and roll overrides attached to a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionExtra {
    pub ally: Option<String>,
    pub environment: Option<String>,
    pub ability: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rolls: RollOverrides,
}

/// A combatant's request to act on its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub actor: CombatantId,
    /// May be omitted for self-only kinds.
    pub target: Option<CombatantId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra: ActionExtra,
}

impl ActionRequest {
    pub fn new(actor: CombatantId, kind: ActionKind) -> Self {
        Self {
            kind,
            actor,
            target: None,
            extra: ActionExtra::default(),
        }
    }

    pub fn with_target(mut self, target: CombatantId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_extra(mut self, extra: ActionExtra) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_rolls(mut self, attack: Option<u32>, damage: Option<u32>) -> Self {
        self.extra.rolls = RollOverrides { attack, damage };
        self
    }
}

/// A status effect placed on a combatant by an action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedStatus {
    pub target: CombatantId,
    pub kind: StatusEffectKind,
    pub duration: u32,
}

/// Result of a successfully resolved action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    /// Rendered catalog template.
    pub narrative: String,
    /// Mechanical summary (rolls, amounts).
    pub description: String,
    pub hit: bool,
    pub critical: bool,
    /// Total HP removed across all targets.
    pub damage: u32,
    /// Total HP restored.
    pub healing: u32,
    pub status_effects: Vec<AppliedStatus>,
    pub target_died: bool,
    /// Combatants reduced to 0 HP by this action.
    pub defeated: Vec<CombatantId>,
    pub combat_ended: bool,
    pub combat_result: Option<CombatResult>,
}
