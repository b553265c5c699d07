//! Shared application state for axum handlers.

use std::sync::Arc;

use servoswitch_app::device::Device;
use servoswitch_app::ports::{Actuator, NetworkProvisioner};

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the actuator and provisioner types do
/// not need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<A, N> {
    /// The device core, also driven by the control loop.
    pub device: Arc<Device<A, N>>,
}

impl<A, N> Clone for AppState<A, N> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
        }
    }
}

impl<A, N> AppState<A, N>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    pub fn new(device: Device<A, N>) -> Self {
        Self {
            device: Arc::new(device),
        }
    }

    /// Create the state from a device already shared with the control loop.
    pub fn from_arc(device: Arc<Device<A, N>>) -> Self {
        Self { device }
    }
}
