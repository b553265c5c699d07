//! # servoswitch-adapter-virtual
//!
//! Simulated backends for every port, used on development machines and in
//! end-to-end tests.
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualServo`] | `Actuator` | Records every commanded angle and its pulse width |
//! | [`VirtualNetwork`] | `NetworkProvisioner` | Drops and restores a fake address; portal ends after a configurable delay |
//! | [`SystemClockSource`] | `TimeSource` | Reads the host clock |
//! | [`FixedTimeSource`] | `TimeSource` | Always answers the same instant |
//! | [`UnreachableTimeSource`] | `TimeSource` | Always fails |
//!
//! ## Dependency rule
//!
//! Depends on `servoswitch-app` (port traits) and `servoswitch-domain` only.

mod clock;
mod network;
mod servo;

pub use clock::{FixedTimeSource, SystemClockSource, UnreachableTimeSource};
pub use network::{NetworkCall, PortalBehaviour, VirtualNetwork};
pub use servo::VirtualServo;
