//! Clock oracle supplying battle-log timestamps.
//!
//! The core never reads the system time itself; shells inject a clock so that
//! resolution stays a pure function of its inputs.

/// Source of wall-clock timestamps in milliseconds since the Unix epoch.
pub trait ClockOracle: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Clock frozen at a fixed instant. Used by tests and replays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl ClockOracle for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}
