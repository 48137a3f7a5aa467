//! Fixed-rate driver for the periodic dungeon update.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::registry::InstanceRegistry;

/// Background task that ticks every live instance at `tick_rate_hz`.
pub struct TickWorker {
    registry: Arc<InstanceRegistry>,
    period: Duration,
    shutdown_rx: oneshot::Receiver<()>,
}

impl TickWorker {
    /// Returns `None` when `tick_rate_hz` is zero; instances then only
    /// advance through explicit ticks.
    pub fn new(
        registry: Arc<InstanceRegistry>,
        tick_rate_hz: u32,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> Option<Self> {
        if tick_rate_hz == 0 {
            return None;
        }
        Some(Self {
            registry,
            period: Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz)),
            shutdown_rx,
        })
    }

    pub async fn run(mut self) {
        let mut interval = time::interval(self.period);
        // a slow tick delays the next one rather than bursting to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(target: "runtime::ticker", period_ms = self.period.as_millis() as u64, "ticker started");

        loop {
            tokio::select! {
                _ = &mut self.shutdown_rx => break,
                _ = interval.tick() => {
                    if let Err(err) = self.registry.tick_all().await {
                        warn!(target: "runtime::ticker", error = %err, "tick failed");
                    }
                }
            }
        }
        debug!(target: "runtime::ticker", "ticker stopped");
    }
}
