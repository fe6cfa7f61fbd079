use std::time::Duration;

use jiff::Timestamp;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{presenter::Presenter, services::tasks::TaskStore, storage::Storage};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Periodic reminder sweep with an explicit start and stop.
pub struct ReminderScheduler {
    interval: Interval,
    cancel: CancellationToken,
}

impl ReminderScheduler {
    /// Must be called from inside a tokio runtime. The first tick is immediate.
    pub fn start(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?period, "reminder scheduler started");

        Self {
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Handle for stopping the scheduler from elsewhere, e.g. on teardown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        if !self.is_stopped() {
            debug!("reminder scheduler stopped");
        }
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the next tick and returns the time to sweep at, or `None`
    /// once stopped. Cancel safe.
    pub async fn next_tick(&mut self) -> Option<Timestamp> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            _ = self.interval.tick() => Some(Timestamp::now()),
        }
    }
}

/// One sweep over the latest saved list. Failures are logged and swallowed so
/// the next tick still runs.
pub fn run_tick<S: Storage, P: Presenter>(
    store: &mut TaskStore<S, P>,
    now: Timestamp,
) -> Option<usize> {
    store.reload();
    match store.fire_due_reminders(now) {
        Ok(fired) => Some(fired),
        Err(e) => {
            warn!(error = %e, "reminder sweep failed");
            None
        }
    }
}

/// Sweeps on every tick until the scheduler is stopped.
pub async fn run<S: Storage, P: Presenter>(
    scheduler: &mut ReminderScheduler,
    store: &mut TaskStore<S, P>,
) {
    while let Some(now) = scheduler.next_tick().await {
        run_tick(store, now);
    }
}
