// src/pipeline/purge.rs

//! Scheduled removal of expired releases.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::error::{AppError, Result};
use crate::services::catalog::purge_expired;
use crate::storage::ReleaseRepository;

/// Recurring job that deletes releases past their retention window.
///
/// The first run happens as soon as the job starts, then once per
/// `period`. A failed run is logged and the next one still happens.
pub struct PurgeJob {
    repository: Arc<dyn ReleaseRepository>,
    period: Duration,
    retention: chrono::Duration,
}

impl PurgeJob {
    pub fn new(
        repository: Arc<dyn ReleaseRepository>,
        period: Duration,
        retention: chrono::Duration,
    ) -> Result<Self> {
        if period.is_zero() || Instant::now().checked_add(period).is_none() {
            return Err(AppError::config(format!(
                "purge period {period:?} is out of range"
            )));
        }
        Ok(Self {
            repository,
            period,
            retention,
        })
    }

    /// Spawn the job on the runtime. It stops once `shutdown` changes or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "Purge job started (every {:?}, keeping {} day(s) past release)",
            self.period,
            self.retention.num_days()
        );

        // The start-up run happens even if shutdown is already pending.
        self.run_once().await;

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => self.run_once().await,
            }
        }

        log::info!("Purge job stopped");
    }

    async fn run_once(&self) {
        let today = Local::now().date_naive();
        if let Err(e) = purge_expired(self.repository.as_ref(), today, self.retention).await {
            log::error!("Purge run failed: {}", e);
        }
    }
}
