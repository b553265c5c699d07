//! # servoswitch-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Actuator`: drive the servo to an angle
//!   - `NetworkProvisioner`: drop the network, reset settings, run the portal
//!   - `TimeSource`: one wall-clock reading from an external source
//! - Provide the use-cases:
//!   - `ActuatorController`: validated actuation with the auto-reset sequence
//!   - `ProvisioningCoordinator`: deferred, blocking network re-provisioning
//!   - `TimeBase`: uptime and the one-shot boot time sync
//! - Bundle them in a single [`device::Device`] behind one lock, and
//!   drive deferred work from the [`control_loop::ControlLoop`]
//!
//! ## Dependency rule
//! Depends on `servoswitch-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod control_loop;
pub mod device;
pub mod ports;
pub mod services;
