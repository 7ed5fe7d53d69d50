//! Background loop driving [`ReminderScheduler`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ReminderScheduler;

/// Owns a running reminder loop. Dropping the handle leaves the loop running;
/// call [`stop`](Self::stop) to end it.
#[derive(Debug)]
pub struct ReminderHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ReminderHandle {
    /// Signal the loop to stop and wait for it to exit. No event is emitted
    /// after this returns.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            warn!(error = %e, "reminder loop ended abnormally");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl ReminderScheduler {
    /// Spawn the reminder loop on the current tokio runtime.
    ///
    /// The loop refreshes the snapshot once, then scans on every check
    /// interval. When `resync_interval_secs` is non-zero it also refreshes
    /// on that cadence.
    #[must_use]
    pub fn spawn(self: &Arc<Self>) -> ReminderHandle {
        let cancel = CancellationToken::new();
        let scheduler = Arc::clone(self);
        let join = tokio::spawn(scheduler.run(cancel.clone()));
        ReminderHandle { cancel, join }
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let check_every = self.config.check_interval();
        let resync_every = self.config.resync_interval();
        info!(
            check_interval_secs = check_every.as_secs(),
            resync_interval_secs = resync_every.map_or(0, |d| d.as_secs()),
            "reminder loop started"
        );

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "initial reminder refresh failed");
        }

        let mut check = time::interval(check_every);
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut resync = resync_every.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = check.tick() => {
                    self.tick();
                }
                () = next_resync(resync.as_mut()) => {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "periodic reminder refresh failed");
                    }
                }
            }
        }

        info!("reminder loop stopped");
    }
}

/// Resolves on the next resync tick, or never when resync is disabled.
async fn next_resync(interval: Option<&mut time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
