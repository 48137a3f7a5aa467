//! High-level runtime orchestrator.
//!
//! The runtime owns the instance registry and the background ticker, wires
//! up the event bus, and exposes a builder-based API for the session layer.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use game_core::{Catalog, Ruleset};

use crate::api::{DungeonHandle, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::EventBus;
use crate::registry::InstanceRegistry;
use crate::workers::TickWorker;

/// Main runtime that hosts dungeon instances
///
/// Runtime owns the registry and ticker; [`DungeonHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    handle: DungeonHandle,
    registry: Arc<InstanceRegistry>,
    ticker: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Start a runtime with the builtin catalog.
    pub fn start(config: RuntimeConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> DungeonHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the ticker, then drops every instance and waits for their
    /// workers to finish.
    pub async fn shutdown(self) -> Result<()> {
        if let Some((stop_tx, ticker)) = self.ticker {
            let _ = stop_tx.send(());
            ticker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        self.registry.shutdown().await?;
        info!(target: "runtime", "runtime stopped");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<Catalog>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Species and move data. Defaults to the builtin catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the runtime. Must be called inside a Tokio runtime.
    pub fn build(self) -> Runtime {
        let catalog = self.catalog.unwrap_or_else(Catalog::builtin);
        let rules = Arc::new(Ruleset::new(self.config.game_config.clone(), catalog));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let registry = Arc::new(InstanceRegistry::new(rules, &self.config, event_bus.clone()));

        let (stop_tx, stop_rx) = oneshot::channel();
        let ticker = TickWorker::new(Arc::clone(&registry), self.config.tick_rate_hz, stop_rx)
            .map(|worker| (stop_tx, tokio::spawn(worker.run())));

        info!(
            target: "runtime",
            tick_rate_hz = self.config.tick_rate_hz,
            seeded = self.config.seed.is_some(),
            "runtime started"
        );

        Runtime {
            handle: DungeonHandle::new(Arc::clone(&registry), event_bus),
            registry,
            ticker,
        }
    }
}
