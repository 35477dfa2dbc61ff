//! Headless combat client.
//!
//! Opens an encounter in an in-memory session store, attaches one autopilot
//! client per party member, and plays the fight to its end. The final session
//! document is printed to stdout as JSON; logs go to stderr.
//!
//! ```bash
//! COMBAT_SEED=7 RUST_LOG=combat=debug cargo run -p combat-client
//! ```
mod config;
mod encounter;

use anyhow::Result;

use config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        target: "combat::client",
        session = %config.session_id,
        seed = ?config.seed,
        "starting encounter"
    );

    let session = encounter::play(&config).await?;

    if config.print_session {
        println!("{}", serde_json::to_string_pretty(&session)?);
    }
    Ok(())
}
