//! Errors raised by the Linux adapters.

use std::io;
use std::path::PathBuf;

use servoswitch_domain::error::ServoSwitchError;

/// Failure of a Linux backend.
#[derive(Debug, thiserror::Error)]
pub enum LinuxAdapterError {
    #[error("cannot write PWM attribute {path}")]
    Pwm {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pulse range is unusable: min < max <= period is required")]
    InvalidPulseRange,

    #[error("command {0:?} is empty")]
    EmptyCommand(&'static str),

    #[error("cannot run {command}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandStatus {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("SNTP exchange with {server} failed")]
    SntpIo {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("SNTP server {0} did not answer in time")]
    SntpTimeout(String),

    #[error("invalid SNTP response: {0}")]
    SntpResponse(&'static str),
}

impl From<LinuxAdapterError> for ServoSwitchError {
    fn from(err: LinuxAdapterError) -> Self {
        match err {
            LinuxAdapterError::Pwm { .. } | LinuxAdapterError::InvalidPulseRange => {
                Self::Hardware(Box::new(err))
            }
            LinuxAdapterError::EmptyCommand(_)
            | LinuxAdapterError::Spawn { .. }
            | LinuxAdapterError::CommandStatus { .. } => Self::Network(Box::new(err)),
            LinuxAdapterError::SntpIo { .. }
            | LinuxAdapterError::SntpTimeout(_)
            | LinuxAdapterError::SntpResponse(_) => Self::TimeSource(Box::new(err)),
        }
    }
}
