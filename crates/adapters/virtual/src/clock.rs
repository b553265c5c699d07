//! Time sources that need no network.

use servoswitch_app::ports::TimeSource;
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::time::{Timestamp, now};

/// Trusts the host's own wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClockSource;

impl TimeSource for SystemClockSource {
    async fn fetch(&self) -> Result<Timestamp, ServoSwitchError> {
        Ok(now())
    }
}

/// Always answers the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl TimeSource for FixedTimeSource {
    async fn fetch(&self) -> Result<Timestamp, ServoSwitchError> {
        Ok(self.0)
    }
}

/// A time source that can never be reached.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnreachableTimeSource;

impl TimeSource for UnreachableTimeSource {
    async fn fetch(&self) -> Result<Timestamp, ServoSwitchError> {
        Err(ServoSwitchError::TimeSource("time source unreachable".into()))
    }
}
