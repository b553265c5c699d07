//! Device configuration: the actuator's operating parameters and the
//! logical light state.

use serde::Serialize;

use crate::angle::Angle;
use crate::error::ValidationError;

const DEFAULT_ON_ANGLE: Angle = const_angle(90);
const DEFAULT_OFF_ANGLE: Angle = Angle::MIN;
const DEFAULT_AUTO_RESET_ANGLE: Angle = const_angle(45);

const fn const_angle(degrees: u8) -> Angle {
    match Angle::new(degrees) {
        Some(angle) => angle,
        None => Angle::MAX,
    }
}

/// Canonical configuration of the device.
///
/// Mutators validate their input and leave the stored value untouched on
/// failure. Nothing here touches hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfiguration {
    light_on: bool,
    on_angle: Angle,
    off_angle: Angle,
    auto_reset_enabled: bool,
    auto_reset_angle: Angle,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            light_on: false,
            on_angle: DEFAULT_ON_ANGLE,
            off_angle: DEFAULT_OFF_ANGLE,
            auto_reset_enabled: false,
            auto_reset_angle: DEFAULT_AUTO_RESET_ANGLE,
        }
    }
}

impl DeviceConfiguration {
    /// Create a builder for constructing a [`DeviceConfiguration`].
    #[must_use]
    pub fn builder() -> DeviceConfigurationBuilder {
        DeviceConfigurationBuilder::default()
    }

    #[must_use]
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    #[must_use]
    pub fn on_angle(&self) -> Angle {
        self.on_angle
    }

    #[must_use]
    pub fn off_angle(&self) -> Angle {
        self.off_angle
    }

    #[must_use]
    pub fn auto_reset_enabled(&self) -> bool {
        self.auto_reset_enabled
    }

    #[must_use]
    pub fn auto_reset_angle(&self) -> Angle {
        self.auto_reset_angle
    }

    /// Replace the angle associated with "light on".
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAngle`] when `raw` is outside
    /// `[0, 180]`; the stored angle is left unchanged.
    pub fn set_on_angle(&mut self, raw: i64) -> Result<Angle, ValidationError> {
        let angle = Angle::try_from(raw)?;
        self.on_angle = angle;
        Ok(angle)
    }

    /// Replace the angle associated with "light off".
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAngle`] when `raw` is outside
    /// `[0, 180]`; the stored angle is left unchanged.
    pub fn set_off_angle(&mut self, raw: i64) -> Result<Angle, ValidationError> {
        let angle = Angle::try_from(raw)?;
        self.off_angle = angle;
        Ok(angle)
    }

    /// Replace the neutral angle used by auto-reset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAngle`] when `raw` is outside
    /// `[0, 180]`; the stored angle is left unchanged.
    pub fn set_auto_reset_angle(&mut self, raw: i64) -> Result<Angle, ValidationError> {
        let angle = Angle::try_from(raw)?;
        self.auto_reset_angle = angle;
        Ok(angle)
    }

    pub fn set_auto_reset_enabled(&mut self, enabled: bool) {
        self.auto_reset_enabled = enabled;
    }

    /// Record the logical light state after a successful actuation.
    pub fn set_light_on(&mut self, light_on: bool) {
        self.light_on = light_on;
    }

    /// Copy of every field, for status reporting.
    #[must_use]
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            light_on: self.light_on,
            auto_reset_enabled: self.auto_reset_enabled,
            auto_reset_angle: self.auto_reset_angle,
            on_angle: self.on_angle,
            off_angle: self.off_angle,
        }
    }
}

/// Point-in-time copy of a [`DeviceConfiguration`].
///
/// Serialized with the field names the device's web UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    #[serde(rename = "isLightOn")]
    pub light_on: bool,
    #[serde(rename = "isAutoResetEnabled")]
    pub auto_reset_enabled: bool,
    #[serde(rename = "autoResetAngle")]
    pub auto_reset_angle: Angle,
    #[serde(rename = "onAngle")]
    pub on_angle: Angle,
    #[serde(rename = "offAngle")]
    pub off_angle: Angle,
}

/// Step-by-step builder for [`DeviceConfiguration`].
///
/// Unset fields keep the factory defaults: on at 90°, off at 0°, auto-reset
/// disabled with a 45° neutral position, light off.
#[derive(Debug, Default)]
pub struct DeviceConfigurationBuilder {
    on_angle: Option<Angle>,
    off_angle: Option<Angle>,
    auto_reset_enabled: Option<bool>,
    auto_reset_angle: Option<Angle>,
}

impl DeviceConfigurationBuilder {
    #[must_use]
    pub fn on_angle(mut self, angle: Angle) -> Self {
        self.on_angle = Some(angle);
        self
    }

    #[must_use]
    pub fn off_angle(mut self, angle: Angle) -> Self {
        self.off_angle = Some(angle);
        self
    }

    #[must_use]
    pub fn auto_reset_enabled(mut self, enabled: bool) -> Self {
        self.auto_reset_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn auto_reset_angle(mut self, angle: Angle) -> Self {
        self.auto_reset_angle = Some(angle);
        self
    }

    /// Consume the builder and return a [`DeviceConfiguration`] with the
    /// light reported as off.
    #[must_use]
    pub fn build(self) -> DeviceConfiguration {
        let defaults = DeviceConfiguration::default();
        DeviceConfiguration {
            light_on: false,
            on_angle: self.on_angle.unwrap_or(defaults.on_angle),
            off_angle: self.off_angle.unwrap_or(defaults.off_angle),
            auto_reset_enabled: self
                .auto_reset_enabled
                .unwrap_or(defaults.auto_reset_enabled),
            auto_reset_angle: self.auto_reset_angle.unwrap_or(defaults.auto_reset_angle),
        }
    }
}

/// Parse the `enable` argument of the auto-reset toggle.
///
/// Exactly `"true"` enables; any other value, including `"TRUE"` or `"1"`,
/// disables.
#[must_use]
pub fn parse_enable_flag(raw: &str) -> bool {
    raw == "true"
}
