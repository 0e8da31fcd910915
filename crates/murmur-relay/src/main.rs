//! murmur-relay: anonymous stranger-chat server over WebSocket.
//!
//! Accepts WebSocket connections, identifies each by a hello frame, and
//! hands chat / cancel / stop / message commands to the pairing engine.
//! The engine pairs strangers and relays their messages without ever
//! revealing who sent them.

mod connection;
mod protocol;
mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use murmur_common::{EngineError, MurmurError};
use murmur_config::MurmurConfig;
use murmur_engine::{Engine, EngineConfig, JsonFileStore, SnapshotStore};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

use crate::connection::{handle_connection, RelayContext};
use crate::registry::ConnectionRegistry;

#[derive(Parser)]
#[command(name = "murmur-relay", about = "Anonymous stranger-chat relay")]
struct Args {
    /// Path to config.toml (defaults to the platform config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> murmur_common::Result<()> {
    let args = Args::parse();
    let mut config = murmur_config::load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = u32::from(port);
    }

    let level = config.logging.level.as_filter();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("murmur_relay={level},murmur_engine={level},murmur_config={level}").into()
            }),
        )
        .init();

    let registry = ConnectionRegistry::new();
    let engine = Engine::new(
        EngineConfig {
            delivery_timeout: config.engine.delivery_timeout(),
            event_capacity: config.engine.event_capacity as usize,
        },
        Arc::new(registry.clone()),
    );

    let store = snapshot_store(&config);
    if let Some(store) = &store {
        restore_snapshot(&engine, store).await?;
    }

    spawn_event_logger(&engine);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| MurmurError::Network(format!("failed to bind {addr}: {e}")))?;
    tracing::info!("murmur-relay listening on {}", addr);

    let ctx = RelayContext {
        engine: engine.clone(),
        registry,
        tiers: config.tiers.clone(),
        hello_timeout: Duration::from_secs(u64::from(config.server.hello_timeout_secs)),
        channel_capacity: config.engine.channel_capacity as usize,
    };

    tokio::select! {
        _ = accept_loop(listener, ctx) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
    }

    if let Some(store) = &store {
        store.save(&engine.snapshot().await)?;
    }
    Ok(())
}

fn snapshot_store(config: &MurmurConfig) -> Option<JsonFileStore> {
    if !config.persistence.enabled {
        return None;
    }
    match config.persistence.resolved_path() {
        Some(path) => Some(JsonFileStore::new(path)),
        None => {
            tracing::warn!("Persistence enabled but no snapshot path could be resolved");
            None
        }
    }
}

/// Load the saved state, if any. An unreadable or inconsistent snapshot
/// stops startup so the shutdown save cannot overwrite it.
async fn restore_snapshot(engine: &Engine, store: &JsonFileStore) -> Result<(), EngineError> {
    match store.load()? {
        Some(snapshot) => engine.restore(snapshot).await,
        None => {
            tracing::info!(path = %store.path().display(), "No snapshot to restore");
            Ok(())
        }
    }
}

/// Surface engine events in the log; a richer front end would render them.
fn spawn_event_logger(engine: &Engine) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(?event, "Engine event"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagging");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn accept_loop(listener: TcpListener, ctx: RelayContext) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, ctx).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_common::{Tier, UserId, UserState};
    use murmur_engine::Notifier;

    fn engine() -> Engine {
        let registry: Arc<dyn Notifier> = Arc::new(ConnectionRegistry::new());
        Engine::new(EngineConfig::default(), registry)
    }

    #[tokio::test]
    async fn missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("snapshot.json"));
        let engine = engine();

        restore_snapshot(&engine, &store).await.unwrap();
        assert_eq!(engine.waiting_count().await, 0);
    }

    #[tokio::test]
    async fn saved_snapshot_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("snapshot.json"));
        let source = engine();
        // Nobody is connected, but queueing never notifies.
        source
            .request_pairing(&UserId::from("alice"), Tier::Standard)
            .await
            .unwrap();
        store.save(&source.snapshot().await).unwrap();

        let engine = engine();
        restore_snapshot(&engine, &store).await.unwrap();
        assert_eq!(
            engine.user_state(&UserId::from("alice")).await,
            UserState::Waiting
        );
    }

    #[tokio::test]
    async fn unreadable_and_invalid_snapshots_both_abort() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let store = JsonFileStore::new(&path);

        std::fs::write(&path, "not json").unwrap();
        assert!(restore_snapshot(&engine(), &store).await.is_err());

        let mut snapshot = engine().snapshot().await;
        snapshot.version = 99;
        store.save(&snapshot).unwrap();
        assert!(restore_snapshot(&engine(), &store).await.is_err());
    }
}
