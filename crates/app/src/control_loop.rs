//! Control loop: the periodic task that drains deferred work.
//!
//! Command handlers only queue provisioning requests; this loop is the one
//! place where the network may be torn down, so an HTTP answer is always
//! flushed before its own connection goes away.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::device::Device;
use crate::ports::{Actuator, NetworkProvisioner};
use crate::services::provisioning::PollResult;

/// Default spacing between two iterations.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Periodic driver of [`Device::poll_deferred`].
pub struct ControlLoop<A, N> {
    device: Arc<Device<A, N>>,
    tick: Duration,
}

impl<A, N> ControlLoop<A, N>
where
    A: Actuator + Send + Sync,
    N: NetworkProvisioner + Send + Sync,
{
    #[must_use]
    pub fn new(device: Arc<Device<A, N>>, tick: Duration) -> Self {
        Self { device, tick }
    }

    /// One iteration.
    pub async fn iterate(&self) -> PollResult {
        self.device.poll_deferred().await
    }

    /// Iterate every `tick` until `shutdown` turns `true` or its sender is
    /// dropped.
    ///
    /// An iteration that runs the configuration portal may take minutes;
    /// ticks missed meanwhile are not replayed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(tick = ?self.tick, "control loop started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let PollResult::Completed(outcome) = self.iterate().await {
                        tracing::debug!(?outcome, "deferred provisioning done");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("control loop stopped");
    }
}
