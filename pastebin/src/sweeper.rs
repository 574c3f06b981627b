//! Background cleanup of expired pastes.
//!
//! Backends already evict expired keys on their own; the sweep only reclaims
//! entries an engine keeps around after their deadline (e.g. on disk). It
//! talks to the store through `list` and `delete` only, so disabling it never
//! changes what callers observe.

use crate::store::PasteStore;
use shared::Result;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

pub struct ExpirySweeper {
    store: PasteStore,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: PasteStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// One pass over the store. A paste deleted concurrently is a no-op miss.
    pub async fn sweep_once(&self) -> Result<SweepReport> {
        self.sweep(&CancellationToken::new()).await
    }

    /// Like `sweep_once`, but stops between deletes once `shutdown` is cancelled.
    async fn sweep(&self, shutdown: &CancellationToken) -> Result<SweepReport> {
        let entries = self.store.list().await?;
        let mut report = SweepReport {
            scanned: entries.len(),
            ..SweepReport::default()
        };

        for (id, ttl) in entries.iter().filter(|(_, ttl)| ttl.is_expired()) {
            if shutdown.is_cancelled() {
                debug!("Sweep interrupted by shutdown");
                break;
            }
            match self.store.delete(id).await {
                Ok(true) => {
                    report.removed += 1;
                    debug!("Swept expired paste {} ({:?})", id, ttl);
                }
                Ok(false) => debug!("Expired paste {} was already gone", id),
                Err(e) => {
                    report.failed += 1;
                    error!("Failed to sweep expired paste {}: {}", id, e);
                }
            }
        }

        Ok(report)
    }

    /// Sweep immediately, then every interval, until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Expiry sweeper started, interval: {:?}", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => match self.sweep(&shutdown).await {
                    Ok(report) => info!(
                        scanned = report.scanned,
                        removed = report.removed,
                        failed = report.failed,
                        "Completed sweep of expired pastes"
                    ),
                    Err(e) => error!("Expiry sweep failed: {}", e),
                },
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Spawn the sweeper on its own task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
