//! Servo signal model: mapping an angle to a PWM pulse width.
//!
//! Hobby servos expect a pulse every 20 ms (50 Hz); the pulse width encodes
//! the position, from `min_pulse_us` at 0° to `max_pulse_us` at 180°.

use serde::{Deserialize, Serialize};

use crate::angle::Angle;

/// Standard hobby-servo refresh period in microseconds (50 Hz).
pub const DEFAULT_PERIOD_US: u32 = 20_000;
/// Pulse width commanding 0°.
pub const DEFAULT_MIN_PULSE_US: u32 = 500;
/// Pulse width commanding 180°.
pub const DEFAULT_MAX_PULSE_US: u32 = 2_500;

/// PWM timing of a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseRange {
    pub period_us: u32,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            period_us: DEFAULT_PERIOD_US,
            min_pulse_us: DEFAULT_MIN_PULSE_US,
            max_pulse_us: DEFAULT_MAX_PULSE_US,
        }
    }
}

impl PulseRange {
    /// Whether the range is usable: `min < max <= period`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_pulse_us < self.max_pulse_us && self.max_pulse_us <= self.period_us
    }

    /// Pulse width in microseconds for `degrees`.
    ///
    /// Degrees above 180 are clamped here, at the point of actuation, so a
    /// bad value can never drive the horn past its mechanical stop.
    #[must_use]
    pub fn pulse_width_us(&self, degrees: u16) -> u32 {
        let degrees = u64::from(degrees.min(u16::from(Angle::MAX.degrees())));
        let span = u64::from(self.max_pulse_us.saturating_sub(self.min_pulse_us));
        let offset = degrees * span / u64::from(Angle::MAX.degrees());
        // offset <= span, so the sum never exceeds max_pulse_us
        u32::try_from(u64::from(self.min_pulse_us) + offset).unwrap_or(self.max_pulse_us)
    }

    /// Pulse width for a validated angle.
    #[must_use]
    pub fn pulse_for(&self, angle: Angle) -> u32 {
        self.pulse_width_us(u16::from(angle.degrees()))
    }
}
