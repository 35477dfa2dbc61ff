//! Canonical encounter state.
//!
//! A [`CombatSession`] is the single shared document every client reads and
//! writes. Combatant order is the initiative order, and indices into it stay
//! stable for the whole encounter.
mod combatant;
mod delta;
mod log;
mod readiness;
mod roster;
mod status;

pub use combatant::{Combatant, CombatantId, Controller, ENEMY_ID_PREFIX, UserId};
pub use delta::{ChangedFields, SessionDelta};
pub use log::{BattleLog, BattleLogEntry, LogKind};
pub use readiness::{BarrierError, BarrierStatus, Quorum, ReadinessBarrier};
pub use roster::{EnemyRecord, PartyMemberRecord, normalize};
pub use status::{StatusEffect, StatusEffectKind, StatusEffects};

use std::collections::BTreeSet;

/// Lifecycle of an encounter.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum CombatState {
    /// Combatants not yet merged.
    #[default]
    Initialized,
    /// Merged, awaiting the explicit begin command.
    Ready,
    /// Turns proceeding.
    Active,
    /// Terminal; no further mutation.
    Ended,
}

/// How an ended encounter concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum CombatResult {
    Victory,
    Defeat,
    Draw,
}

/// Position in the turn sequence, ordered by round then index.
///
/// Used to tell whether a given turn has already been processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnStamp {
    pub round: u32,
    pub turn: usize,
}

impl core::fmt::Display for TurnStamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "r{}t{}", self.round, self.turn)
    }
}

/// Shared state of one encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSession {
    pub id: String,
    /// Initiative order.
    pub combatants: Vec<Combatant>,
    /// Index into `combatants` of the acting combatant.
    pub current_turn: usize,
    /// Starts at 1; increments when the turn wraps to the front.
    pub round: u32,
    pub combat_state: CombatState,
    pub result: Option<CombatResult>,
    pub battle_log: BattleLog,
    pub story_context: String,
    pub environmental_features: Vec<String>,
    pub team_up_opportunities: Vec<String>,
    pub readiness: ReadinessBarrier,
    /// Seed for every dice roll in this encounter.
    pub seed: u64,
    /// Optimistic-concurrency stamp maintained by the session store.
    pub version: u64,
}

impl CombatSession {
    /// Creates an empty session in the `Initialized` state.
    pub fn new(id: impl Into<String>, seed: u64) -> Self {
        Self {
            id: id.into(),
            combatants: Vec::new(),
            current_turn: 0,
            round: 1,
            combat_state: CombatState::Initialized,
            result: None,
            battle_log: BattleLog::new(),
            story_context: String::new(),
            environmental_features: Vec::new(),
            team_up_opportunities: Vec::new(),
            readiness: ReadinessBarrier::default(),
            seed,
            version: 0,
        }
    }

    pub fn with_story_context(mut self, story_context: impl Into<String>) -> Self {
        self.story_context = story_context.into();
        self
    }

    pub fn with_environmental_features(mut self, features: Vec<String>) -> Self {
        self.environmental_features = features;
        self
    }

    pub fn with_team_up_opportunities(mut self, opportunities: Vec<String>) -> Self {
        self.team_up_opportunities = opportunities;
        self
    }

    pub fn is_active(&self) -> bool {
        self.combat_state == CombatState::Active
    }

    pub fn is_ended(&self) -> bool {
        self.combat_state == CombatState::Ended
    }

    pub fn turn_stamp(&self) -> TurnStamp {
        TurnStamp {
            round: self.round,
            turn: self.current_turn,
        }
    }

    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.combatants.get(self.current_turn)
    }

    pub fn index_of(&self, id: &CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| &c.id == id)
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| &c.id == id)
    }

    pub fn combatant_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| &c.id == id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .iter()
            .filter(|c| c.is_player() && c.is_alive())
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .iter()
            .filter(|c| c.is_enemy() && c.is_alive())
    }

    pub fn has_living_players(&self) -> bool {
        self.living_players().next().is_some()
    }

    pub fn has_living_enemies(&self) -> bool {
        self.living_enemies().next().is_some()
    }

    /// Terminal outcome implied by the roster alone, if any.
    ///
    /// An all-dead roster is a draw; otherwise a side with no one standing
    /// has lost.
    pub fn terminal_result(&self) -> Option<CombatResult> {
        if !self.combatants.iter().any(Combatant::is_alive) {
            Some(CombatResult::Draw)
        } else if !self.has_living_players() {
            Some(CombatResult::Defeat)
        } else if !self.has_living_enemies() {
            Some(CombatResult::Victory)
        } else {
            None
        }
    }

    /// Distinct owners of living party members.
    pub fn barrier_participants(&self) -> BTreeSet<UserId> {
        self.living_players()
            .filter_map(|c| c.owner().cloned())
            .collect()
    }

    /// True if `user` owns the combatant whose turn it is.
    pub fn is_users_turn(&self, user: &UserId) -> bool {
        self.current_combatant()
            .and_then(Combatant::owner)
            .is_some_and(|owner| owner == user)
    }

    /// Appends a log entry stamped with the current round and turn.
    pub fn log(&mut self, kind: LogKind, timestamp: u64, description: impl Into<String>) {
        let (round, turn) = (self.round, self.current_turn);
        self.battle_log
            .push(kind, round, turn, timestamp, description);
    }
}

impl Default for CombatSession {
    fn default() -> Self {
        Self::new("", 0)
    }
}
