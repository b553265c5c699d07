//! Provisioning coordinator: accepts re-provisioning requests from the
//! command path and runs the blocking sequence from the control loop.
//!
//! ```text
//! Idle ──request──▶ PendingTrigger ──poll (later tick, window elapsed)──▶ Running ──▶ Idle
//! ```

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use servoswitch_domain::action::{DeferredAction, Offer, PendingSlot, PortalOutcome, ProvisioningState};
use servoswitch_domain::error::ServoSwitchError;

use crate::ports::NetworkProvisioner;

/// Default lifetime of a configuration portal session.
pub const DEFAULT_PORTAL_TIMEOUT: Duration = Duration::from_secs(180);

/// Default time left to the triggering response before the network goes
/// away. Matches the default control-loop tick.
pub const DEFAULT_FLUSH_WINDOW: Duration = Duration::from_millis(100);

/// What a single [`ProvisioningCoordinator::poll_and_run`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// Nothing was due on this tick.
    Nothing,
    /// The sequence ran to the end of the portal step.
    Completed(PortalOutcome),
    /// A step failed; the sequence stopped and the coordinator is idle again.
    Failed,
}

/// Application service sequencing the [`NetworkProvisioner`] port.
pub struct ProvisioningCoordinator<N> {
    provisioner: N,
    slot: PendingSlot,
    tick: u64,
    portal_timeout: Duration,
    flush_window: Duration,
    state: watch::Sender<ProvisioningState>,
}

impl<N: NetworkProvisioner> ProvisioningCoordinator<N> {
    /// Create a coordinator whose portal sessions end after `portal_timeout`.
    pub fn new(provisioner: N, portal_timeout: Duration) -> Self {
        let (state, _) = watch::channel(ProvisioningState::Idle);
        Self {
            provisioner,
            slot: PendingSlot::default(),
            tick: 0,
            portal_timeout,
            flush_window: DEFAULT_FLUSH_WINDOW,
            state,
        }
    }

    /// Minimum time between a request and the start of the teardown.
    pub fn set_flush_window(&mut self, flush_window: Duration) {
        self.flush_window = flush_window;
    }

    /// Access the underlying provisioner.
    pub fn provisioner(&self) -> &N {
        &self.provisioner
    }

    #[must_use]
    pub fn state(&self) -> ProvisioningState {
        *self.state.borrow()
    }

    /// Watch state transitions without holding a reference to the coordinator.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProvisioningState> {
        self.state.subscribe()
    }

    /// Ask for the network to be re-provisioned on a later control-loop tick.
    ///
    /// Never blocks and never touches the network. A request made while one
    /// is already pending or running is ignored.
    pub fn request_reconfiguration(&mut self) -> Offer {
        if self.state() == ProvisioningState::Running {
            return Offer::AlreadyPending;
        }
        let offer = self.slot.offer(
            DeferredAction::ReconfigureNetwork,
            self.tick,
            Instant::now().into_std(),
        );
        if offer == Offer::Queued {
            self.state.send_replace(ProvisioningState::PendingTrigger);
            tracing::info!(tick = self.tick, "network reconfiguration requested");
        }
        offer
    }

    /// Run the pending action if it was queued on an earlier tick and at
    /// least one flush window ago.
    ///
    /// Must be called exactly once per control-loop iteration. Iterations
    /// that were delayed and now run back to back do not shorten the window.
    /// The portal step blocks the caller until an operator configured the
    /// device or the portal timeout elapsed.
    pub async fn poll_and_run(&mut self) -> PollResult {
        let due = self
            .slot
            .take_due(self.tick, Instant::now().into_std(), self.flush_window);
        self.tick += 1;

        match due {
            None => PollResult::Nothing,
            Some(DeferredAction::ReconfigureNetwork) => {
                self.state.send_replace(ProvisioningState::Running);
                let result = match self.reconfigure().await {
                    Ok(outcome) => {
                        tracing::info!(?outcome, "network reconfiguration finished");
                        PollResult::Completed(outcome)
                    }
                    Err(err) => {
                        tracing::error!(error = %err, source = ?std::error::Error::source(&err), "network reconfiguration failed");
                        PollResult::Failed
                    }
                };
                self.state.send_replace(ProvisioningState::Idle);
                result
            }
        }
    }

    async fn reconfigure(&self) -> Result<PortalOutcome, ServoSwitchError> {
        tracing::info!("dropping network association and stored credentials");
        self.provisioner.disconnect_and_forget().await?;
        self.provisioner.reset_settings().await?;

        tracing::info!(timeout = ?self.portal_timeout, "starting configuration portal");
        let portal = self.provisioner.run_portal(self.portal_timeout);
        match tokio::time::timeout(self.portal_timeout, portal).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!("configuration portal did not return before its timeout");
                Ok(PortalOutcome::TimedOut)
            }
        }
    }
}
