//! Read-only collaborators injected into the engine.
//!
//! Oracles expose dice and time. The [`CombatEnv`] aggregate bundles them so
//! the engine can reach everything it needs without coupling to concrete
//! implementations.
mod clock;
mod rng;

pub use clock::{ClockOracle, FixedClock};
pub use rng::{PcgRng, RngOracle, compute_seed};

static PCG: PcgRng = PcgRng;
static EPOCH: FixedClock = FixedClock(0);

/// Aggregates the oracles required by the action pipeline.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    rng: &'a dyn RngOracle,
    clock: &'a dyn ClockOracle,
}

impl<'a> CombatEnv<'a> {
    pub fn new(rng: &'a dyn RngOracle, clock: &'a dyn ClockOracle) -> Self {
        Self { rng, clock }
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    pub fn clock(&self) -> &'a dyn ClockOracle {
        self.clock
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }
}

impl CombatEnv<'static> {
    /// PCG dice with a clock frozen at the epoch.
    pub fn deterministic() -> Self {
        Self::new(&PCG, &EPOCH)
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv").finish_non_exhaustive()
    }
}
