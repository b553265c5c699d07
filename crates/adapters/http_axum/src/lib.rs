//! # servoswitch-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **command surface** the device's web UI talks to
//!   (`/turnLightOn`, `/setOnAngle`, `/status`, …), accepting both `GET`
//!   and `POST`
//! - Map query arguments into validated core calls on the shared
//!   [`Device`](servoswitch_app::device::Device) (driving adapter)
//! - Map results into plain-text or JSON responses, and failures into
//!   `400`/`500` with a plain-text reason
//!
//! ## Dependency rule
//! Depends on `servoswitch-app` (for the device and port traits) and
//! `servoswitch-domain` (for response types). Never leaks axum types into
//! the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
