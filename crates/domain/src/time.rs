//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for the boot wall-clock time.
pub type Timestamp = DateTime<Utc>;

/// Reported in place of the boot time when the startup sync failed.
pub const UNSYNCED: &str = "unsynced";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Format an elapsed duration as `HH:MM:SS`.
///
/// Hours are zero-padded to two digits and never wrap, so four days of
/// uptime read `96:00:00`.
#[must_use]
pub fn format_uptime(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// The startup time synchronisation did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("time synchronisation unavailable")]
pub struct TimeSyncUnavailable;

/// Wall-clock time at which the process started, if it could be learned.
///
/// Set at most once per process lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootTimeRecord {
    boot_wall_clock: Option<Timestamp>,
}

impl BootTimeRecord {
    /// A record for a process whose clock was never synchronised.
    #[must_use]
    pub fn unsynced() -> Self {
        Self::default()
    }

    /// Derive the boot time from a wall-clock reading taken `uptime` after
    /// the process started.
    #[must_use]
    pub fn from_reading(reading: Timestamp, uptime: Duration) -> Self {
        let uptime = chrono::Duration::from_std(uptime).unwrap_or(chrono::Duration::zero());
        Self {
            boot_wall_clock: Some(reading - uptime),
        }
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.boot_wall_clock.is_some()
    }

    /// The boot wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSyncUnavailable`] when the startup sync failed.
    pub fn boot_wall_clock(&self) -> Result<Timestamp, TimeSyncUnavailable> {
        self.boot_wall_clock.ok_or(TimeSyncUnavailable)
    }

    /// RFC 3339 boot time, or [`UNSYNCED`].
    #[must_use]
    pub fn describe(&self) -> String {
        self.boot_wall_clock.map_or_else(
            || UNSYNCED.to_string(),
            |ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

/// Telemetry answer of the time base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub uptime: String,
    #[serde(rename = "bootTime")]
    pub boot_time: String,
}
