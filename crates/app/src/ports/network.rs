//! Network provisioning port: Wi-Fi association owned by an external library
//! or system service.

use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use servoswitch_domain::action::PortalOutcome;
use servoswitch_domain::error::ServoSwitchError;

/// Tears down and re-establishes the device's network association.
///
/// The provisioning coordinator calls the async methods in order:
///
/// 1. [`disconnect_and_forget`](Self::disconnect_and_forget)
/// 2. [`reset_settings`](Self::reset_settings)
/// 3. [`run_portal`](Self::run_portal), which may take minutes
pub trait NetworkProvisioner {
    /// Leave the current network and discard its stored credentials.
    fn disconnect_and_forget(&self) -> impl Future<Output = Result<(), ServoSwitchError>> + Send;

    /// Clear any persisted provisioning configuration.
    fn reset_settings(&self) -> impl Future<Output = Result<(), ServoSwitchError>> + Send;

    /// Open the configuration portal and wait until an operator configured a
    /// network or `timeout` elapsed.
    fn run_portal(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<PortalOutcome, ServoSwitchError>> + Send;

    /// Current local address on the configured network, if any.
    fn local_ip(&self) -> Option<IpAddr>;
}

impl<T: NetworkProvisioner + Send + Sync> NetworkProvisioner for Arc<T> {
    fn disconnect_and_forget(&self) -> impl Future<Output = Result<(), ServoSwitchError>> + Send {
        (**self).disconnect_and_forget()
    }

    fn reset_settings(&self) -> impl Future<Output = Result<(), ServoSwitchError>> + Send {
        (**self).reset_settings()
    }

    fn run_portal(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<PortalOutcome, ServoSwitchError>> + Send {
        (**self).run_portal(timeout)
    }

    fn local_ip(&self) -> Option<IpAddr> {
        (**self).local_ip()
    }
}
