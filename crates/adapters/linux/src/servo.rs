//! Servo on a sysfs PWM channel.
//!
//! ```text
//! <chip>/export            ← channel number (once)
//! <chip>/pwm<N>/period     ← period in ns
//! <chip>/pwm<N>/duty_cycle ← pulse width in ns, one write per move
//! <chip>/pwm<N>/enable     ← 1
//! ```

use std::path::{Path, PathBuf};

use servoswitch_app::ports::Actuator;
use servoswitch_domain::angle::Angle;
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::servo::PulseRange;

use crate::config::SysfsServoConfig;
use crate::error::LinuxAdapterError;

const NANOS_PER_MICRO: u64 = 1_000;

/// A hobby servo wired to one PWM channel.
#[derive(Debug)]
pub struct SysfsServo {
    channel_dir: PathBuf,
    pulses: PulseRange,
}

impl SysfsServo {
    /// Export the channel if needed, program the period and enable output.
    ///
    /// # Errors
    ///
    /// Returns [`LinuxAdapterError::InvalidPulseRange`] for an unusable
    /// range, or [`LinuxAdapterError::Pwm`] when a sysfs attribute cannot be
    /// written.
    pub async fn open(config: &SysfsServoConfig) -> Result<Self, LinuxAdapterError> {
        if !config.pulses.is_valid() {
            return Err(LinuxAdapterError::InvalidPulseRange);
        }

        let channel_dir = config.chip.join(format!("pwm{}", config.channel));
        if !tokio::fs::try_exists(&channel_dir).await.unwrap_or(false) {
            write_attribute(&config.chip.join("export"), config.channel).await?;
            tracing::debug!(channel = config.channel, "PWM channel exported");
        }

        let servo = Self {
            channel_dir,
            pulses: config.pulses,
        };
        servo
            .write("period", u64::from(config.pulses.period_us) * NANOS_PER_MICRO)
            .await?;
        servo.write("enable", 1).await?;
        tracing::info!(channel = %servo.channel_dir.display(), "servo PWM enabled");
        Ok(servo)
    }

    async fn write(&self, attribute: &str, value: u64) -> Result<(), LinuxAdapterError> {
        write_attribute(&self.channel_dir.join(attribute), value).await
    }
}

async fn write_attribute(
    path: &Path,
    value: impl std::fmt::Display,
) -> Result<(), LinuxAdapterError> {
    tokio::fs::write(path, value.to_string())
        .await
        .map_err(|source| LinuxAdapterError::Pwm {
            path: path.to_path_buf(),
            source,
        })
}

impl Actuator for SysfsServo {
    async fn move_to(&self, angle: Angle) -> Result<(), ServoSwitchError> {
        let pulse_us = self.pulses.pulse_for(angle);
        self.write("duty_cycle", u64::from(pulse_us) * NANOS_PER_MICRO)
            .await?;
        tracing::debug!(%angle, pulse_us, "servo duty cycle written");
        Ok(())
    }
}
