//! Wall-clock oracle for live sessions.

use chrono::Utc;
use combat_core::{ClockOracle, CombatEnv, PcgRng};

/// Battle-log timestamps from the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl ClockOracle for SystemClock {
    fn now_millis(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }
}

static PCG: PcgRng = PcgRng;
static SYSTEM: SystemClock = SystemClock;

/// Seeded dice with wall-clock timestamps.
///
/// Dice depend only on the session seed and turn stamp, so every client
/// resolving the same turn reaches the same result.
pub fn live_env() -> CombatEnv<'static> {
    CombatEnv::new(&PCG, &SYSTEM)
}
