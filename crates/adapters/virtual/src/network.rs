//! Virtual network provisioner: a fake Wi-Fi association.

use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;

use servoswitch_app::ports::NetworkProvisioner;
use servoswitch_domain::action::PortalOutcome;
use servoswitch_domain::error::ServoSwitchError;

/// One call received by a [`VirtualNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCall {
    DisconnectAndForget,
    ResetSettings,
    RunPortal,
}

/// What the simulated operator does once the portal opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PortalBehaviour {
    /// Submit credentials after `after_ms`.
    Configure { after_ms: u64 },
    /// Never show up; the portal runs until its timeout.
    Abandon,
}

impl Default for PortalBehaviour {
    fn default() -> Self {
        Self::Configure { after_ms: 1_000 }
    }
}

#[derive(Debug, Default)]
struct Inner {
    associated: Option<IpAddr>,
    calls: Vec<NetworkCall>,
}

/// Simulated provisioner owning a single fake address.
#[derive(Debug)]
pub struct VirtualNetwork {
    address: IpAddr,
    portal: PortalBehaviour,
    inner: Mutex<Inner>,
}

impl VirtualNetwork {
    /// A network already associated with `address`.
    #[must_use]
    pub fn new(address: IpAddr, portal: PortalBehaviour) -> Self {
        Self {
            address,
            portal,
            inner: Mutex::new(Inner {
                associated: Some(address),
                calls: Vec::new(),
            }),
        }
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<NetworkCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: NetworkCall) {
        self.lock().calls.push(call);
    }
}

impl NetworkProvisioner for VirtualNetwork {
    async fn disconnect_and_forget(&self) -> Result<(), ServoSwitchError> {
        let mut inner = self.lock();
        inner.calls.push(NetworkCall::DisconnectAndForget);
        inner.associated = None;
        tracing::info!("virtual network disconnected");
        Ok(())
    }

    async fn reset_settings(&self) -> Result<(), ServoSwitchError> {
        self.record(NetworkCall::ResetSettings);
        Ok(())
    }

    async fn run_portal(&self, timeout: Duration) -> Result<PortalOutcome, ServoSwitchError> {
        self.record(NetworkCall::RunPortal);
        match self.portal {
            PortalBehaviour::Configure { after_ms } if Duration::from_millis(after_ms) < timeout => {
                tokio::time::sleep(Duration::from_millis(after_ms)).await;
                self.lock().associated = Some(self.address);
                tracing::info!(address = %self.address, "virtual network configured");
                Ok(PortalOutcome::Configured)
            }
            _ => {
                tokio::time::sleep(timeout).await;
                Ok(PortalOutcome::TimedOut)
            }
        }
    }

    fn local_ip(&self) -> Option<IpAddr> {
        self.lock().associated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> IpAddr {
        IpAddr::from([192, 168, 4, 2])
    }

    #[test]
    fn should_start_associated() {
        let network = VirtualNetwork::new(address(), PortalBehaviour::default());
        assert_eq!(network.local_ip(), Some(address()));
        assert!(network.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_lose_address_until_portal_configures() {
        let network = VirtualNetwork::new(address(), PortalBehaviour::Configure { after_ms: 2_000 });

        network.disconnect_and_forget().await.unwrap();
        network.reset_settings().await.unwrap();
        assert_eq!(network.local_ip(), None);

        let started = tokio::time::Instant::now();
        let outcome = network.run_portal(Duration::from_secs(60)).await.unwrap();

        assert_eq!(outcome, PortalOutcome::Configured);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(network.local_ip(), Some(address()));
        assert_eq!(
            network.calls(),
            vec![
                NetworkCall::DisconnectAndForget,
                NetworkCall::ResetSettings,
                NetworkCall::RunPortal
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_when_abandoned() {
        let network = VirtualNetwork::new(address(), PortalBehaviour::Abandon);
        network.disconnect_and_forget().await.unwrap();

        let outcome = network.run_portal(Duration::from_secs(5)).await.unwrap();

        assert_eq!(outcome, PortalOutcome::TimedOut);
        assert_eq!(network.local_ip(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_when_operator_is_slower_than_timeout() {
        let network =
            VirtualNetwork::new(address(), PortalBehaviour::Configure { after_ms: 10_000 });
        let outcome = network.run_portal(Duration::from_secs(5)).await.unwrap();
        assert_eq!(outcome, PortalOutcome::TimedOut);
    }
}
