//! Backend selection.
//!
//! Each port gets a wrapper enum over the concrete adapters so that a single
//! [`Device`](servoswitch_app::device::Device) type serves every combination
//! chosen in the configuration.

use std::net::IpAddr;
use std::time::Duration;

use servoswitch_adapter_linux::{CommandProvisioner, SntpTimeSource, SysfsServo};
use servoswitch_adapter_virtual::{
    SystemClockSource, UnreachableTimeSource, VirtualNetwork, VirtualServo,
};
use servoswitch_app::ports::{Actuator, NetworkProvisioner, TimeSource};
use servoswitch_domain::action::PortalOutcome;
use servoswitch_domain::angle::Angle;
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::time::Timestamp;

use crate::config::{
    ActuatorBackend, ActuatorSection, NetworkBackend, NetworkSection, TimeBackend, TimeSection,
};

/// Wrapper enum for the servo drivers.
#[derive(Debug)]
pub enum ServoBackend {
    Virtual(VirtualServo),
    Sysfs(SysfsServo),
}

impl ServoBackend {
    /// Open the configured servo.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM channel cannot be prepared.
    pub async fn open(section: &ActuatorSection) -> anyhow::Result<Self> {
        Ok(match section.backend {
            ActuatorBackend::Virtual => Self::Virtual(VirtualServo::new(section.pwm.pulses)),
            ActuatorBackend::Sysfs => Self::Sysfs(SysfsServo::open(&section.pwm).await?),
        })
    }
}

impl Actuator for ServoBackend {
    async fn move_to(&self, angle: Angle) -> Result<(), ServoSwitchError> {
        match self {
            Self::Virtual(s) => s.move_to(angle).await,
            Self::Sysfs(s) => s.move_to(angle).await,
        }
    }
}

/// Wrapper enum for the Wi-Fi provisioners.
#[derive(Debug)]
pub enum ProvisionerBackend {
    Virtual(VirtualNetwork),
    Command(CommandProvisioner),
}

impl ProvisionerBackend {
    #[must_use]
    pub fn from_config(section: &NetworkSection) -> Self {
        match section.backend {
            NetworkBackend::Virtual => Self::Virtual(VirtualNetwork::new(
                section.simulated.address,
                section.simulated.portal,
            )),
            NetworkBackend::Command => {
                Self::Command(CommandProvisioner::new(section.command.clone()))
            }
        }
    }
}

impl NetworkProvisioner for ProvisionerBackend {
    async fn disconnect_and_forget(&self) -> Result<(), ServoSwitchError> {
        match self {
            Self::Virtual(n) => n.disconnect_and_forget().await,
            Self::Command(n) => n.disconnect_and_forget().await,
        }
    }

    async fn reset_settings(&self) -> Result<(), ServoSwitchError> {
        match self {
            Self::Virtual(n) => n.reset_settings().await,
            Self::Command(n) => n.reset_settings().await,
        }
    }

    async fn run_portal(&self, timeout: Duration) -> Result<PortalOutcome, ServoSwitchError> {
        match self {
            Self::Virtual(n) => n.run_portal(timeout).await,
            Self::Command(n) => n.run_portal(timeout).await,
        }
    }

    fn local_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Virtual(n) => n.local_ip(),
            Self::Command(n) => n.local_ip(),
        }
    }
}

/// Wrapper enum for the wall-clock references.
#[derive(Debug)]
pub enum ClockBackend {
    System(SystemClockSource),
    Sntp(SntpTimeSource),
    Disabled(UnreachableTimeSource),
}

impl ClockBackend {
    #[must_use]
    pub fn from_config(section: &TimeSection) -> Self {
        match section.source {
            TimeBackend::Virtual => Self::System(SystemClockSource),
            TimeBackend::Sntp => Self::Sntp(SntpTimeSource::new(&section.sntp)),
            TimeBackend::None => Self::Disabled(UnreachableTimeSource),
        }
    }
}

impl TimeSource for ClockBackend {
    async fn fetch(&self) -> Result<Timestamp, ServoSwitchError> {
        match self {
            Self::System(c) => c.fetch().await,
            Self::Sntp(c) => c.fetch().await,
            Self::Disabled(c) => c.fetch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn should_open_virtual_backends_by_default() {
        let config = Config::default();

        let servo = ServoBackend::open(&config.actuator).await.unwrap();
        assert!(matches!(servo, ServoBackend::Virtual(_)));
        servo.move_to(Angle::MAX).await.unwrap();

        let network = ProvisionerBackend::from_config(&config.network);
        assert!(matches!(network, ProvisionerBackend::Virtual(_)));
        assert_eq!(network.local_ip(), Some(config.network.simulated.address));

        let clock = ClockBackend::from_config(&config.time);
        assert!(clock.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn should_fail_fetch_when_time_source_disabled() {
        let mut config = Config::default();
        config.time.source = TimeBackend::None;

        let clock = ClockBackend::from_config(&config.time);

        assert!(matches!(
            clock.fetch().await,
            Err(ServoSwitchError::TimeSource(_))
        ));
    }

    #[test]
    fn should_select_command_provisioner() {
        let mut config = Config::default();
        config.network.backend = NetworkBackend::Command;

        let network = ProvisionerBackend::from_config(&config.network);

        assert!(matches!(network, ProvisionerBackend::Command(_)));
    }
}
