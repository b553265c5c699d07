//! Deferred actions: work requested by a command but executed later by the
//! control loop.
//!
//! A command handler must answer promptly, yet some work (tearing down the
//! network that carries the answer) is unsafe to run before the answer has
//! left the device. The handler therefore queues a [`DeferredAction`] in a
//! [`PendingSlot`]; the control loop drains it on a later iteration, once
//! the answer has had a full flush window to leave.

use std::fmt;
use std::time::{Duration, Instant};

/// Work that only the control loop may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Drop the current network, forget its credentials and open the
    /// configuration portal.
    ReconfigureNetwork,
}

/// Lifecycle of the network re-provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisioningState {
    #[default]
    Idle,
    /// Requested, waiting for the next control-loop iteration.
    PendingTrigger,
    /// Teardown and portal in progress.
    Running,
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::PendingTrigger => f.write_str("pending_trigger"),
            Self::Running => f.write_str("running"),
        }
    }
}

/// How a configuration portal session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalOutcome {
    /// An operator supplied working credentials.
    Configured,
    /// Nobody configured the device before the portal timeout.
    TimedOut,
}

/// Result of offering an action to a [`PendingSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    /// The slot was already occupied; the offer was ignored.
    AlreadyPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Queued {
    action: DeferredAction,
    tick: u64,
    at: Instant,
}

/// Single-slot queue of deferred work, with ignore-while-pending semantics.
///
/// Each queued action remembers the control-loop tick and the instant it was
/// queued at. It only becomes due on a strictly later tick and once the
/// flush window has elapsed, however close together the ticks run.
#[derive(Debug, Default)]
pub struct PendingSlot {
    queued: Option<Queued>,
}

impl PendingSlot {
    /// Queue `action` at `tick` unless something is already pending.
    pub fn offer(&mut self, action: DeferredAction, tick: u64, now: Instant) -> Offer {
        if self.queued.is_some() {
            return Offer::AlreadyPending;
        }
        self.queued = Some(Queued {
            action,
            tick,
            at: now,
        });
        Offer::Queued
    }

    /// Remove and return the pending action if it was queued before `tick`
    /// and at least `flush_window` before `now`.
    pub fn take_due(
        &mut self,
        tick: u64,
        now: Instant,
        flush_window: Duration,
    ) -> Option<DeferredAction> {
        match self.queued {
            Some(queued)
                if queued.tick < tick && now.saturating_duration_since(queued.at) >= flush_window =>
            {
                self.queued = None;
                Some(queued.action)
            }
            _ => None,
        }
    }
}
