use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::types::ChangeEvent;
use super::{lock, Inner, Poller};

/// Floor for the poll period; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

impl Poller {
    /// Start polling on the configured interval, with one poll right away.
    ///
    /// Does nothing if already active; the first handler stays in place.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, on_changes: F)
    where
        F: Fn(Vec<ChangeEvent>) + Send + Sync + 'static,
    {
        let mut lifecycle = lock(&self.inner.lifecycle);
        if lifecycle.schedule.is_some() {
            tracing::debug!("Poller already active, ignoring start");
            return;
        }

        let period = self.inner.settings.poll_interval.max(MIN_POLL_INTERVAL);
        lifecycle.handler = Some(Arc::new(on_changes));
        lifecycle.schedule = Some(tokio::spawn(run_schedule(
            Arc::downgrade(&self.inner),
            period,
        )));

        tracing::info!(
            interval_secs = period.as_secs(),
            repos = self.inner.settings.repos.len(),
            "Started polling"
        );
    }

    /// Stop the schedule and drop the handler.
    ///
    /// A poll already in flight finishes, but its changes are discarded.
    pub fn stop(&self) {
        let mut lifecycle = lock(&self.inner.lifecycle);
        if let Some(schedule) = lifecycle.schedule.take() {
            schedule.abort();
            tracing::info!("Stopped polling");
        }
        lifecycle.handler = None;
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.lifecycle).schedule.is_some()
    }
}

/// Spawn a poll cycle on every tick. The first tick fires immediately.
///
/// Holds only a weak reference so that dropping the poller ends the schedule.
async fn run_schedule(inner: Weak<Inner>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };
        tokio::spawn(async move {
            inner.poll().await;
        });
    }
}
