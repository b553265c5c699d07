//! Linux backend configuration.

use std::path::PathBuf;

use serde::Deserialize;

use servoswitch_domain::servo::PulseRange;

/// Sysfs PWM channel driving the servo.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SysfsServoConfig {
    /// PWM chip directory, e.g. `/sys/class/pwm/pwmchip0`.
    pub chip: PathBuf,
    /// Channel exported on the chip.
    pub channel: u32,
    #[serde(flatten)]
    pub pulses: PulseRange,
}

impl Default for SysfsServoConfig {
    fn default() -> Self {
        Self {
            chip: PathBuf::from("/sys/class/pwm/pwmchip0"),
            channel: 0,
            pulses: PulseRange::default(),
        }
    }
}

/// External commands performing each provisioning step.
///
/// Each command is an argv list; the first element is the program.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandProvisionerConfig {
    /// Leave the current network and delete its stored connection.
    pub disconnect: Vec<String>,
    /// Clear any remaining provisioning state.
    pub reset: Vec<String>,
    /// Open the configuration portal; exits successfully once configured.
    pub portal: Vec<String>,
    /// Address used to pick the outbound interface when reporting the local
    /// address. No packet is sent to it.
    pub route_address: String,
}

impl Default for CommandProvisionerConfig {
    fn default() -> Self {
        Self {
            disconnect: argv(&["nmcli", "device", "disconnect", "wlan0"]),
            reset: argv(&["nmcli", "connection", "delete", "id", "servoswitch"]),
            portal: argv(&["wifi-connect", "--portal-ssid", "servoswitch"]),
            route_address: "192.0.2.1:80".to_string(),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_string()).collect()
}

/// SNTP server queried once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SntpConfig {
    /// `host:port` of the server.
    pub server: String,
    /// How long to wait for the answer, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            server: "pool.ntp.org:123".to_string(),
            timeout_ms: 2_000,
        }
    }
}
