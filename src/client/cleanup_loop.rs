use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::watch;
use tokio::time::interval_at;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::ClientInner;
use crate::network::WatchCommand;
use crate::ConfigTransport;

/// Periodic sweep of idle subscriptions and cached values
pub(crate) struct CleanupLoop<T> {
    inner: Arc<ClientInner<T>>,
    shutdown_signal: watch::Receiver<()>,
    period: Duration,
    inactivity_threshold: Duration,
}

impl<T: ConfigTransport> CleanupLoop<T> {
    pub(crate) fn new(
        inner: Arc<ClientInner<T>>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let period = inner.config.cleanup_interval();
        let inactivity_threshold = inner.config.inactivity_threshold();
        Self {
            inner,
            shutdown_signal,
            period,
            inactivity_threshold,
        }
    }

    /// Sweeps every period until shutdown. No final sweep on exit.
    pub(crate) async fn run(mut self) {
        let mut interval = interval_at(tokio::time::Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_signal.changed() => {
                    debug!("[CleanupLoop] shutdown signal received");
                    return;
                }
                _ = interval.tick() => {
                    self.sweep_at(Instant::now());
                }
            }
        }
    }

    /// Removes what has been idle since `now - inactivity_threshold` and asks
    /// the server to drop the removed subscriptions.
    pub(crate) fn sweep_at(
        &self,
        now: Instant,
    ) -> Vec<u32> {
        let Some(timelimit) = now.checked_sub(self.inactivity_threshold) else {
            return Vec::new();
        };

        let mut context = self.inner.context.lock();
        let generation = context.generation();
        let removed = context.cleanup(timelimit);
        for subscription_id in &removed {
            self.inner.commands.push(
                generation,
                WatchCommand::Unsubscribe {
                    subscription_id: *subscription_id,
                },
            );
        }
        if !removed.is_empty() {
            debug!(count = removed.len(), "[CleanupLoop] unsubscribed idle subscriptions");
        }
        removed
    }
}
