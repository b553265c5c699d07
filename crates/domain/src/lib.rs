//! # servoswitch-domain
//!
//! Pure domain model for the servoswitch actuator device.
//!
//! ## Responsibilities
//! - Foundational types: validated servo [`Angle`](angle::Angle), error conventions, timestamps
//! - Define the **device configuration** (light state, on/off angles, auto-reset)
//! - Define the **deferred actions** queued by commands and drained by the control loop
//! - Define the **provisioning states** and portal outcomes
//! - Uptime formatting and the one-shot **boot time record**
//! - Contain all invariant enforcement (angle range, single pending action)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod action;
pub mod angle;
pub mod configuration;
pub mod servo;
