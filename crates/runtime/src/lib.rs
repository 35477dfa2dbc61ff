//! Runtime orchestration for shared combat sessions.
//!
//! This crate bridges the pure rules in `combat-core` to a shared session
//! document that several clients read and write concurrently. Consumers embed
//! [`SyncRuntime`] to attach to an encounter, subscribe to events, and act
//! through [`CombatClient`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`providers`] holds the built-in enemy and autopilot policies
//! - [`repository`] defines the session store contract and an in-memory store
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod providers;
pub mod repository;
pub mod runtime;
pub mod session;

mod workers;

pub use api::{ActionProvider, CombatClient, IdleActionProvider, Result, RuntimeError};
pub use clock::{SystemClock, live_env};
pub use config::SyncConfig;
pub use events::{BarrierEvent, Event, EventBus, SessionEvent, Topic, TurnEvent};
pub use providers::{Decision, EnemyPolicy, PartyPolicy, choose_action};
pub use repository::{
    InMemorySessionStore, LogPatch, RepositoryError, SessionPatch, SessionStore,
    SessionSubscription,
};
pub use runtime::{SyncRuntime, SyncRuntimeBuilder};
pub use session::{new_session, open_session};
