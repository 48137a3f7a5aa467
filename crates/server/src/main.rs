//! Dungeon server entry point.
//!
//! Hosts the dungeon runtime for a real-time session layer. The process
//! loads content, starts the runtime, logs its events and shuts down
//! cleanly on Ctrl-C.
mod logging;
mod settings;

use anyhow::{Context, Result};
use runtime::{Event, Runtime, RuntimeConfig, Topic};
use settings::ServerSettings;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let settings = ServerSettings::from_env();
    let _log_guard = logging::setup_logging(&settings.log_dir)?;

    let (game_config, catalog) = settings.load_content()?;
    let config = RuntimeConfig::from_env().with_game_config(game_config);
    let runtime = Runtime::builder().config(config).catalog(catalog).build();

    let handle = runtime.handle();
    let loggers: Vec<_> = handle
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, rx)| tokio::spawn(log_events(topic, rx)))
        .collect();

    info!("dungeon server ready; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    runtime.shutdown().await?;
    for logger in loggers {
        logger.abort();
    }
    Ok(())
}

async fn log_events(topic: Topic, mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => debug!(target: "server::events", ?topic, event = ?event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "server::events", ?topic, skipped, "event logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
