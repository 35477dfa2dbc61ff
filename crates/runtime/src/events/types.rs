//! Event types for different topics.

use combat_core::{
    ActionKind, ActionOutcome, CombatResult, CombatantId, Controller, TurnStamp, UserId,
};
use serde::{Deserialize, Serialize};

/// Changes to the shared session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The local copy now reflects `version` of the stored document.
    Synced { version: u64, stamp: TurnStamp },

    /// An action resolved and its result was accepted by the store.
    ActionResolved {
        actor: CombatantId,
        kind: ActionKind,
        target: CombatantId,
        hit: bool,
        critical: bool,
        damage: u32,
        healing: u32,
        narrative: String,
    },

    /// An action was rejected by the rules.
    ActionFailed {
        actor: CombatantId,
        kind: ActionKind,
        code: String,
        error: String,
    },

    /// Another client wrote first; the local result was dropped.
    WriteConflict { expected: u64, actual: u64 },

    Ended { result: CombatResult },
}

impl SessionEvent {
    pub fn resolved(
        actor: CombatantId,
        kind: ActionKind,
        target: CombatantId,
        outcome: &ActionOutcome,
    ) -> Self {
        Self::ActionResolved {
            actor,
            kind,
            target,
            hit: outcome.hit,
            critical: outcome.critical,
            damage: outcome.damage,
            healing: outcome.healing,
            narrative: outcome.narrative.clone(),
        }
    }
}

/// Whose turn it is (lightweight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub stamp: TurnStamp,
    pub combatant: CombatantId,
    pub controller: Controller,
}

/// Readiness barrier transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierEvent {
    /// An enemy turn resolved; the party must acknowledge it.
    Raised { stamp: TurnStamp },
    Acknowledged {
        user: UserId,
        ready: usize,
        required: usize,
    },
    Cleared,
}
