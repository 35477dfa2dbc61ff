//! Synchronizer configuration and loaders.

use std::env;
use std::time::Duration;

use combat_core::{CombatConfig, Quorum};

/// Settings shared by the synchronizer worker and its channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Presentation pause before an enemy (or autopilot) turn resolves.
    pub enemy_turn_delay: Duration,
    /// Pause before a turn that failed unexpectedly is forcibly advanced.
    pub error_retry_delay: Duration,
    /// One acknowledgement clears the readiness barrier.
    pub solo_mode: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub combat: CombatConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enemy_turn_delay: Duration::from_millis(1500),
            error_retry_delay: Duration::from_millis(2000),
            solo_mode: false,
            event_buffer_size: 100,
            command_buffer_size: 32,
            combat: CombatConfig::default(),
        }
    }
}

impl SyncConfig {
    /// No pacing delays. Used by tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            enemy_turn_delay: Duration::ZERO,
            error_retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_ENEMY_TURN_DELAY_MS` - Pause before enemy turns (default: 1500)
    /// - `COMBAT_ERROR_RETRY_DELAY_MS` - Pause before a forced advance (default: 2000)
    /// - `COMBAT_SOLO_MODE` - Single acknowledgement clears the barrier (default: false)
    /// - `COMBAT_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `COMBAT_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `COMBAT_DEFAULT_HP` - HP for records without one (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("COMBAT_ENEMY_TURN_DELAY_MS") {
            config.enemy_turn_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("COMBAT_ERROR_RETRY_DELAY_MS") {
            config.error_retry_delay = Duration::from_millis(ms);
        }
        if let Some(solo) = read_env_bool("COMBAT_SOLO_MODE") {
            config.solo_mode = solo;
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(hp) = read_env::<u32>("COMBAT_DEFAULT_HP") {
            config.combat = CombatConfig::with_default_hp(hp);
        }

        config
    }

    pub fn quorum(&self) -> Quorum {
        if self.solo_mode {
            Quorum::Solo
        } else {
            Quorum::LivingParty
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_mode_selects_single_acknowledgement() {
        let mut config = SyncConfig::default();
        assert_eq!(config.quorum(), Quorum::LivingParty);
        config.solo_mode = true;
        assert_eq!(config.quorum(), Quorum::Solo);
    }

    #[test]
    fn immediate_has_no_delays() {
        let config = SyncConfig::immediate();
        assert_eq!(config.enemy_turn_delay, Duration::ZERO);
        assert_eq!(config.command_buffer_size, 32);
    }
}
