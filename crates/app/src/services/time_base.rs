//! Time base: process uptime and the boot wall-clock time learned once at
//! startup.

use std::time::Duration;

use tokio::time::Instant;

use servoswitch_domain::time::{
    BootTimeRecord, TimeInfo, TimeSyncUnavailable, Timestamp, format_uptime,
};

use crate::ports::TimeSource;

/// How hard the startup synchronisation tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Monotonic uptime plus the boot wall-clock time.
#[derive(Debug)]
pub struct TimeBase {
    started: Instant,
    boot: BootTimeRecord,
    attempted: bool,
}

impl TimeBase {
    /// Start counting uptime now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            boot: BootTimeRecord::unsynced(),
            attempted: false,
        }
    }

    /// Time elapsed since [`TimeBase::start`].
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn boot_record(&self) -> BootTimeRecord {
        self.boot
    }

    /// Learn the boot wall-clock time from `source`.
    ///
    /// Runs at most once per process; later calls return the recorded value
    /// (or the recorded failure) without contacting the source.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSyncUnavailable`] when every attempt failed.
    pub async fn synchronise<S: TimeSource>(
        &mut self,
        source: &S,
        policy: SyncPolicy,
    ) -> Result<Timestamp, TimeSyncUnavailable> {
        if self.attempted {
            return self.boot.boot_wall_clock();
        }
        self.attempted = true;

        let attempts = policy.attempts.max(1);
        for attempt in 1..=attempts {
            match source.fetch().await {
                Ok(reading) => {
                    self.boot = BootTimeRecord::from_reading(reading, self.uptime());
                    tracing::info!(boot_time = %self.boot.describe(), attempt, "time synchronised");
                    return self.boot.boot_wall_clock();
                }
                Err(err) => {
                    tracing::warn!(error = %err, source = ?std::error::Error::source(&err), attempt, attempts, "time source unreachable");
                    if attempt < attempts {
                        tokio::time::sleep(policy.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!("time synchronisation failed, boot time stays unsynced");
        Err(TimeSyncUnavailable)
    }

    /// Current uptime and boot time, formatted for clients.
    #[must_use]
    pub fn now(&self) -> TimeInfo {
        TimeInfo {
            uptime: format_uptime(self.uptime()),
            boot_time: self.boot.describe(),
        }
    }
}
