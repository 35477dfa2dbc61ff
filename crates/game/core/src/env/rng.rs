//! Seeded dice.
//!
//! Rolls are pure functions of a seed: every client that resolves the same
//! turn of the same encounter derives the same seeds and therefore reads the
//! same dice. No generator state is carried between rolls.

/// Source of dice results keyed by an explicit seed.
pub trait RngOracle: Send + Sync {
    /// Uniform 32-bit value for `seed`.
    fn next_u32(&self, seed: u64) -> u32;

    /// One die of `sides` faces, in `1..=sides`. A zero-sided die counts as a d1.
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        self.next_u32(seed) % sides.max(1) + 1
    }
}

/// Single-step PCG-XSH-RR over the seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

const PCG_MULTIPLIER: u64 = 6364136223846793005;
const PCG_INCREMENT: u64 = 1442695040888963407;

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = seed
            .wrapping_mul(PCG_MULTIPLIER)
            .wrapping_add(PCG_INCREMENT);
        let mixed = (((state >> 18) ^ state) >> 27) as u32;
        mixed.rotate_right((state >> 59) as u32)
    }
}

/// Seed for one roll inside an encounter.
///
/// `turn` is the index of the acting combatant. `context` separates the rolls
/// a single action makes:
///
/// - `0`: attack roll
/// - `16 + 16 * slot + i`: i-th amount die against the target in `slot`
pub fn compute_seed(session_seed: u64, round: u32, turn: usize, context: u32) -> u64 {
    let mixed = session_seed
        ^ u64::from(round).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (turn as u64).wrapping_mul(0x517c_c1b7_2722_0a95)
        ^ u64::from(context).wrapping_mul(0x85eb_ca6b);
    avalanche(mixed)
}

/// murmur3 finalizer.
fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^ (h >> 33)
}
