//! # servoswitch-adapter-linux
//!
//! Backends for a Linux single-board computer driving a hobby servo.
//!
//! | Adapter | Port | Mechanism |
//! |---------|------|-----------|
//! | [`SysfsServo`] | `Actuator` | `/sys/class/pwm` channel at 50 Hz |
//! | [`CommandProvisioner`] | `NetworkProvisioner` | External commands (e.g. `nmcli`, a captive-portal helper) |
//! | [`SntpTimeSource`] | `TimeSource` | One SNTP v4 request over UDP |
//!
//! ## Dependency rule
//!
//! Depends on `servoswitch-app` (port traits) and `servoswitch-domain` only.

pub mod config;
pub mod error;
mod network;
mod servo;
mod sntp;

pub use config::{CommandProvisionerConfig, SntpConfig, SysfsServoConfig};
pub use error::LinuxAdapterError;
pub use network::CommandProvisioner;
pub use servo::SysfsServo;
pub use sntp::SntpTimeSource;
