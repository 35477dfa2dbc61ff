//! Deterministic combat rules shared across clients.
//!
//! `combat-core` defines the canonical encounter rules (combatants, action
//! catalog, turn sequencing, action resolution) and exposes pure APIs that the
//! runtime and offline tools reuse. All session mutation flows through
//! [`engine::CombatEngine`], and supporting crates depend on the types
//! re-exported here.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{
    ActionError, ActionExtra, ActionKind, ActionOutcome, ActionProfile, ActionRequest,
    AppliedStatus, RollOverrides, SpecialAbility, TargetPolicy, available_actions, is_available,
    legal_targets, special_ability, special_ability_of,
};
pub use config::CombatConfig;
pub use engine::{CombatEngine, TurnAdvance, TurnError};
pub use env::{ClockOracle, CombatEnv, FixedClock, PcgRng, RngOracle, compute_seed};
pub use error::{CombatError, ErrorSeverity};
pub use state::{
    BarrierError, BarrierStatus, BattleLog, BattleLogEntry, ChangedFields, CombatResult,
    CombatSession, CombatState, Combatant, CombatantId, Controller, EnemyRecord, LogKind,
    PartyMemberRecord, Quorum, ReadinessBarrier, SessionDelta, StatusEffect, StatusEffectKind,
    StatusEffects, TurnStamp, UserId, normalize,
};
