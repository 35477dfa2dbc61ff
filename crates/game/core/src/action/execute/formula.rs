//! Dice rolls and hit resolution.
//!
//! Every roll is keyed by `(session seed, round, turn, context)`, so any
//! client resolving the same turn computes the same numbers.

use crate::action::Dice;
use crate::env::{RngOracle, compute_seed};
use crate::state::CombatSession;

/// Context of the d20 attack roll.
const ATTACK_CONTEXT: u32 = 0;
/// First context of amount dice; each target slot gets its own block.
const AMOUNT_CONTEXT_BASE: u32 = 16;
const CONTEXTS_PER_SLOT: u32 = 16;

const CRITICAL_FACE: u32 = 20;
const FUMBLE_FACE: u32 = 1;

/// Seeded dice for one turn of one session.
pub(super) struct Roller<'a> {
    rng: &'a dyn RngOracle,
    seed: u64,
    round: u32,
    turn: usize,
}

impl<'a> Roller<'a> {
    pub(super) fn new(rng: &'a dyn RngOracle, session: &CombatSession) -> Self {
        Self {
            rng,
            seed: session.seed,
            round: session.round,
            turn: session.current_turn,
        }
    }

    fn die(&self, context: u32, sides: u32) -> u32 {
        let seed = compute_seed(self.seed, self.round, self.turn, context);
        self.rng.roll_die(seed, sides)
    }

    /// Natural d20, or the override clamped to a legal face.
    pub(super) fn d20(&self, natural: Option<u32>) -> u32 {
        natural.map_or_else(
            || self.die(ATTACK_CONTEXT, 20),
            |face| face.clamp(FUMBLE_FACE, CRITICAL_FACE),
        )
    }

    /// Sum of `dice` for the target in `slot`, including the flat bonus.
    pub(super) fn amount(&self, dice: Dice, slot: u32) -> u32 {
        let base = AMOUNT_CONTEXT_BASE + slot * CONTEXTS_PER_SLOT;
        (0..dice.count)
            .map(|i| self.die(base + i, dice.sides))
            .sum::<u32>()
            + dice.bonus
    }
}

/// Outcome of a d20 attack roll against armor class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct AttackRoll {
    pub natural: u32,
    pub total: i32,
    pub target_ac: i32,
    pub hit: bool,
    pub critical: bool,
}

/// d20 + modifiers against AC. A natural 1 always misses and a natural 20
/// always hits as a critical.
pub(super) fn attack_roll(natural: u32, modifier: i32, target_ac: i32) -> AttackRoll {
    let total = i32::try_from(natural).unwrap_or(i32::MAX).saturating_add(modifier);
    let critical = natural == CRITICAL_FACE;
    let hit = natural != FUMBLE_FACE && (critical || total >= target_ac);
    AttackRoll {
        natural,
        total,
        target_ac,
        hit,
        critical,
    }
}

/// Applies the critical multiplier and the weakened penalty.
pub(super) fn scale_damage(base: u32, critical: bool, weakened: bool) -> u32 {
    let damage = if critical { base.saturating_mul(2) } else { base };
    if weakened {
        (damage / 2).max(1)
    } else {
        damage
    }
}
