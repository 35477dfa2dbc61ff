//! In-memory session store for tests and local play.

mod session;

pub use session::InMemorySessionStore;
