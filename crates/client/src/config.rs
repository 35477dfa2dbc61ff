//! Client configuration loaded from the environment.
use std::env;

use combat_runtime::SyncConfig;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub session_id: String,
    /// Fixed encounter seed; drawn at random when absent.
    pub seed: Option<u64>,
    pub print_session: bool,
    pub sync: SyncConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session_id: "skirmish".to_owned(),
            seed: None,
            print_session: true,
            sync: SyncConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_SESSION_ID` - Encounter document id (default: skirmish)
    /// - `COMBAT_SEED` - Encounter seed (default: random)
    /// - `COMBAT_PRINT_SESSION` - Print the final document as JSON (default: true)
    ///
    /// Synchronizer settings come from [`SyncConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            sync: SyncConfig::from_env(),
            ..Self::default()
        };

        if let Ok(id) = env::var("COMBAT_SESSION_ID")
            && !id.trim().is_empty()
        {
            config.session_id = id.trim().to_owned();
        }
        config.seed = env::var("COMBAT_SEED").ok().and_then(|v| v.parse().ok());
        if let Ok(value) = env::var("COMBAT_PRINT_SESSION") {
            config.print_session =
                !matches!(value.to_lowercase().as_str(), "false" | "0" | "no" | "off");
        }

        config
    }
}
