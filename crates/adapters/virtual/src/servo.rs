//! Virtual servo: remembers where it was told to go.

use std::sync::{Mutex, MutexGuard, PoisonError};

use servoswitch_app::ports::Actuator;
use servoswitch_domain::angle::Angle;
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::servo::PulseRange;

/// A simulated servo horn.
#[derive(Debug, Default)]
pub struct VirtualServo {
    pulses: PulseRange,
    history: Mutex<Vec<Angle>>,
}

impl VirtualServo {
    #[must_use]
    pub fn new(pulses: PulseRange) -> Self {
        Self {
            pulses,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Last commanded angle, `None` before the first move.
    #[must_use]
    pub fn position(&self) -> Option<Angle> {
        self.lock().last().copied()
    }

    /// Every commanded angle, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Angle> {
        self.lock().clone()
    }

    /// Pulse width that would currently be driven, in microseconds.
    #[must_use]
    pub fn pulse_width_us(&self) -> Option<u32> {
        self.position().map(|angle| self.pulses.pulse_for(angle))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Angle>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuator for VirtualServo {
    async fn move_to(&self, angle: Angle) -> Result<(), ServoSwitchError> {
        self.lock().push(angle);
        tracing::debug!(%angle, pulse_us = self.pulses.pulse_for(angle), "virtual servo moved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle(degrees: u8) -> Angle {
        Angle::new(degrees).unwrap()
    }

    #[test]
    fn should_start_without_position() {
        let servo = VirtualServo::default();
        assert_eq!(servo.position(), None);
        assert_eq!(servo.pulse_width_us(), None);
    }

    #[tokio::test]
    async fn should_record_moves_in_order() {
        let servo = VirtualServo::default();
        servo.move_to(angle(90)).await.unwrap();
        servo.move_to(angle(45)).await.unwrap();

        assert_eq!(servo.history(), vec![angle(90), angle(45)]);
        assert_eq!(servo.position(), Some(angle(45)));
        assert_eq!(servo.pulse_width_us(), Some(1_000));
    }

    #[tokio::test]
    async fn should_use_configured_pulse_range() {
        let servo = VirtualServo::new(PulseRange {
            min_pulse_us: 1_000,
            max_pulse_us: 2_000,
            ..PulseRange::default()
        });
        servo.move_to(Angle::MAX).await.unwrap();
        assert_eq!(servo.pulse_width_us(), Some(2_000));
    }
}
