//! Actuator port: the servo horn standing in for a light switch.

use std::future::Future;
use std::sync::Arc;

use servoswitch_domain::angle::Angle;
use servoswitch_domain::error::ServoSwitchError;

/// Drives a physical (or simulated) servo.
pub trait Actuator {
    /// Command the servo to `angle`.
    ///
    /// Returns once the command has been issued; it does not wait for the
    /// horn to reach the position.
    fn move_to(&self, angle: Angle) -> impl Future<Output = Result<(), ServoSwitchError>> + Send;
}

impl<T: Actuator + Send + Sync> Actuator for Arc<T> {
    fn move_to(&self, angle: Angle) -> impl Future<Output = Result<(), ServoSwitchError>> + Send {
        (**self).move_to(angle)
    }
}
