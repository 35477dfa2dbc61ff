//! Built-in action providers.
//!
//! [`EnemyPolicy`] drives non-player combatants. [`PartyPolicy`] plays a
//! user's characters when a client runs on autopilot.

pub mod enemy;
pub mod party;

pub use enemy::{Decision, EnemyPolicy, choose_action};
pub use party::PartyPolicy;
