//! Time source port: external wall-clock reference (NTP server, host clock).

use std::future::Future;
use std::sync::Arc;

use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::time::Timestamp;

/// Provides one wall-clock reading per call.
pub trait TimeSource {
    /// Fetch the current UTC time from the source.
    fn fetch(&self) -> impl Future<Output = Result<Timestamp, ServoSwitchError>> + Send;
}

impl<T: TimeSource + Send + Sync> TimeSource for Arc<T> {
    fn fetch(&self) -> impl Future<Output = Result<Timestamp, ServoSwitchError>> + Send {
        (**self).fetch()
    }
}
