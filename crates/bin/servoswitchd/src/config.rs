//! Configuration loading from a TOML file with environment variable overrides.
//!
//! Looks for `servoswitch.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::Deserialize;

use servoswitch_adapter_linux::{CommandProvisionerConfig, SntpConfig, SysfsServoConfig};
use servoswitch_adapter_virtual::PortalBehaviour;
use servoswitch_app::services::time_base::SyncPolicy;
use servoswitch_domain::angle::Angle;
use servoswitch_domain::configuration::DeviceConfiguration;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Angles and auto-reset at startup.
    pub device: DeviceSection,
    /// Servo backend.
    pub actuator: ActuatorSection,
    /// Wi-Fi provisioning backend.
    pub network: NetworkSection,
    /// Boot time synchronisation.
    pub time: TimeSection,
    pub control_loop: ControlLoopSection,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Initial device configuration. Values are degrees in `[0, 180]`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    pub on_angle: i64,
    pub off_angle: i64,
    pub auto_reset_enabled: bool,
    pub auto_reset_angle: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorBackend {
    #[default]
    Virtual,
    Sysfs,
}

/// Servo backend and PWM parameters.
///
/// The pulse range applies to both backends; `chip` and `channel` only to
/// `sysfs`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActuatorSection {
    pub backend: ActuatorBackend,
    #[serde(flatten)]
    pub pwm: SysfsServoConfig,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkBackend {
    #[default]
    Virtual,
    Command,
}

/// Simulated network settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VirtualNetworkConfig {
    /// Address reported while associated.
    pub address: IpAddr,
    pub portal: PortalBehaviour,
}

/// Wi-Fi provisioning backend.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    pub backend: NetworkBackend,
    /// Lifetime of a configuration portal session, in seconds.
    pub portal_timeout_secs: u64,
    #[serde(rename = "virtual")]
    pub simulated: VirtualNetworkConfig,
    pub command: CommandProvisionerConfig,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBackend {
    /// Trust the host clock.
    #[default]
    Virtual,
    Sntp,
    /// Never synchronise; boot time stays unsynced.
    None,
}

/// Boot time synchronisation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimeSection {
    pub source: TimeBackend,
    /// Attempts before giving up for the process lifetime.
    pub attempts: u32,
    /// Pause between two attempts, in milliseconds.
    pub retry_delay_ms: u64,
    pub sntp: SntpConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlLoopSection {
    /// Spacing between two iterations, in milliseconds.
    pub tick_ms: u64,
}

impl Config {
    /// Load configuration from `servoswitch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SERVOSWITCH_CONFIG").unwrap_or_else(|_| "servoswitch.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SERVOSWITCH_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SERVOSWITCH_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("SERVOSWITCH_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SERVOSWITCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        self.device_configuration()?;
        if !self.actuator.pwm.pulses.is_valid() {
            return Err(ConfigError::Validation(
                "actuator pulse range must satisfy min < max <= period".to_string(),
            ));
        }
        if self.network.portal_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "network.portal_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.time.attempts == 0 {
            return Err(ConfigError::Validation(
                "time.attempts must be at least 1".to_string(),
            ));
        }
        if self.control_loop.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "control_loop.tick_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the initial [`DeviceConfiguration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first angle outside
    /// `[0, 180]`.
    pub fn device_configuration(&self) -> Result<DeviceConfiguration, ConfigError> {
        let angle = |name: &str, raw: i64| {
            Angle::try_from(raw)
                .map_err(|err| ConfigError::Validation(format!("device.{name}: {err}")))
        };
        Ok(DeviceConfiguration::builder()
            .on_angle(angle("on_angle", self.device.on_angle)?)
            .off_angle(angle("off_angle", self.device.off_angle)?)
            .auto_reset_enabled(self.device.auto_reset_enabled)
            .auto_reset_angle(angle("auto_reset_angle", self.device.auto_reset_angle)?)
            .build())
    }

    #[must_use]
    pub fn portal_timeout(&self) -> Duration {
        Duration::from_secs(self.network.portal_timeout_secs)
    }

    #[must_use]
    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            attempts: self.time.attempts,
            retry_delay: Duration::from_millis(self.time.retry_delay_ms),
        }
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.control_loop.tick_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "servoswitchd=info,servoswitch=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        let defaults = DeviceConfiguration::default();
        Self {
            on_angle: i64::from(defaults.on_angle().degrees()),
            off_angle: i64::from(defaults.off_angle().degrees()),
            auto_reset_enabled: defaults.auto_reset_enabled(),
            auto_reset_angle: i64::from(defaults.auto_reset_angle().degrees()),
        }
    }
}

impl Default for VirtualNetworkConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 4, 1)),
            portal: PortalBehaviour::default(),
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            backend: NetworkBackend::default(),
            portal_timeout_secs: servoswitch_app::services::provisioning::DEFAULT_PORTAL_TIMEOUT
                .as_secs(),
            simulated: VirtualNetworkConfig::default(),
            command: CommandProvisionerConfig::default(),
        }
    }
}

impl Default for TimeSection {
    fn default() -> Self {
        let policy = SyncPolicy::default();
        Self {
            source: TimeBackend::default(),
            attempts: policy.attempts,
            retry_delay_ms: u64::try_from(policy.retry_delay.as_millis()).unwrap_or(u64::MAX),
            sntp: SntpConfig::default(),
        }
    }
}

impl Default for ControlLoopSection {
    fn default() -> Self {
        Self {
            tick_ms: u64::try_from(servoswitch_app::control_loop::DEFAULT_TICK.as_millis())
                .unwrap_or(100),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.actuator.backend, ActuatorBackend::Virtual);
        assert_eq!(config.network.backend, NetworkBackend::Virtual);
        assert_eq!(config.time.source, TimeBackend::Virtual);
        assert_eq!(config.portal_timeout(), Duration::from_secs(180));
        assert_eq!(config.tick(), Duration::from_millis(100));
        assert_eq!(config.sync_policy(), SyncPolicy::default());
    }

    #[test]
    fn should_start_from_factory_device_configuration() {
        let device = Config::default().device_configuration().unwrap();
        assert_eq!(device, DeviceConfiguration::default());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [device]
            on_angle = 120
            off_angle = 20
            auto_reset_enabled = true
            auto_reset_angle = 70

            [actuator]
            backend = 'sysfs'
            chip = '/sys/class/pwm/pwmchip1'
            channel = 2
            min_pulse_us = 600

            [network]
            backend = 'command'
            portal_timeout_secs = 300

            [network.command]
            portal = ['wifi-connect']

            [network.virtual]
            address = '10.0.0.5'
            portal = { mode = 'abandon' }

            [time]
            source = 'sntp'
            attempts = 5
            retry_delay_ms = 500

            [time.sntp]
            server = 'time.example.com:123'

            [control_loop]
            tick_ms = 50
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.logging.filter, "debug");

        let device = config.device_configuration().unwrap();
        assert_eq!(device.on_angle().degrees(), 120);
        assert_eq!(device.off_angle().degrees(), 20);
        assert!(device.auto_reset_enabled());
        assert_eq!(device.auto_reset_angle().degrees(), 70);

        assert_eq!(config.actuator.backend, ActuatorBackend::Sysfs);
        assert_eq!(config.actuator.pwm.chip, PathBuf::from("/sys/class/pwm/pwmchip1"));
        assert_eq!(config.actuator.pwm.channel, 2);
        assert_eq!(config.actuator.pwm.pulses.min_pulse_us, 600);
        assert_eq!(config.actuator.pwm.pulses.max_pulse_us, 2_500);

        assert_eq!(config.network.backend, NetworkBackend::Command);
        assert_eq!(config.portal_timeout(), Duration::from_secs(300));
        assert_eq!(config.network.command.portal, vec!["wifi-connect"]);
        assert_eq!(config.network.simulated.address, IpAddr::from([10, 0, 0, 5]));
        assert_eq!(config.network.simulated.portal, PortalBehaviour::Abandon);

        assert_eq!(config.time.source, TimeBackend::Sntp);
        assert_eq!(config.sync_policy().attempts, 5);
        assert_eq!(config.sync_policy().retry_delay, Duration::from_millis(500));
        assert_eq!(config.time.sntp.server, "time.example.com:123");
        assert_eq!(config.tick(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_out_of_range_initial_angle() {
        let mut config = Config::default();
        config.device.off_angle = 181;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("device.off_angle"));
    }

    #[test]
    fn should_reject_inverted_pulse_range() {
        let mut config = Config::default();
        config.actuator.pwm.pulses.min_pulse_us = 3_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_attempts_and_zero_tick() {
        let mut config = Config::default();
        config.time.attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.control_loop.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.portal_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_custom_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_backend() {
        let result: Result<Config, _> = toml::from_str("[actuator]\nbackend = 'gpio'");
        assert!(result.is_err());
    }
}
