//! Scripted encounter played by autopilot clients.
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use combat_core::{CombatSession, EnemyRecord, PartyMemberRecord};
use combat_runtime::{
    BarrierEvent, Event, InMemorySessionStore, PartyPolicy, SessionEvent, SessionStore,
    SyncRuntime, Topic, new_session, open_session,
};

use crate::config::ClientConfig;

fn party() -> Vec<PartyMemberRecord> {
    vec![
        PartyMemberRecord::new("aria", "Aria")
            .with_class("Fighter")
            .with_level(3)
            .with_hp(28, 28),
        PartyMemberRecord::new("brother-tam", "Brother Tam")
            .with_class("Cleric")
            .with_level(3)
            .with_hp(22, 22),
        PartyMemberRecord::new("wren", "Wren")
            .with_class("Rogue")
            .with_level(2)
            .with_hp(16, 16),
    ]
}

fn enemies() -> Vec<EnemyRecord> {
    vec![
        EnemyRecord::new("Bandit Captain").with_hp(24, 24).with_ac(14),
        EnemyRecord::new("Bandit").with_hp(11, 11),
        EnemyRecord::new("Bandit").with_hp(11, 11),
    ]
}

/// Plays the encounter to completion and returns the final stored document.
pub async fn play(config: &ClientConfig) -> Result<CombatSession> {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let session = new_session(config.session_id.clone(), config.seed)
        .with_story_context("A toll bridge held by bandits at dusk.")
        .with_environmental_features(vec![
            "Rotten railing over the river".to_owned(),
            "Stacked crates for cover".to_owned(),
        ]);
    open_session(store.as_ref(), session).await?;

    let party = party();
    let mut runtimes = Vec::with_capacity(party.len());
    for member in &party {
        let runtime = SyncRuntime::builder()
            .config(config.sync.clone())
            .store(Arc::clone(&store))
            .session(config.session_id.clone())
            .user(member.owner.as_str())
            .autopilot(PartyPolicy::default())
            .build()
            .await
            .with_context(|| format!("attaching {}", member.owner))?;
        runtimes.push(runtime);
    }

    let host = runtimes
        .first()
        .map(SyncRuntime::handle)
        .context("encounter has no party")?;
    let mut session_events = host.subscribe(Topic::Session);
    let mut barrier_events = host.subscribe(Topic::Barrier);

    host.start_combat(party, enemies()).await?;
    let first = host.begin_combat().await?;
    debug!(target: "combat::client", ?first, "combat begun");

    loop {
        tokio::select! {
            event = session_events.recv() => match event {
                Ok(Event::Session(SessionEvent::ActionResolved { narrative, .. })) => {
                    info!(target: "combat::client", "{narrative}");
                }
                Ok(Event::Session(SessionEvent::ActionFailed { actor, error, .. })) => {
                    warn!(target: "combat::client", %actor, "action failed: {error}");
                }
                Ok(Event::Session(SessionEvent::Ended { result })) => {
                    info!(target: "combat::client", %result, "encounter finished");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "combat::client", skipped, "event stream lagged");
                    if host.snapshot().await?.is_ended() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            event = barrier_events.recv() => {
                if let Ok(Event::Barrier(BarrierEvent::Acknowledged { user, ready, required })) = event {
                    debug!(target: "combat::client", %user, ready, required, "acknowledged");
                }
            }
        }
    }

    let session = host.snapshot().await?;
    for runtime in runtimes {
        runtime.shutdown().await?;
    }
    Ok(session)
}
