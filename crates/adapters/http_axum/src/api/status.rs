//! Telemetry handlers.

use std::net::{IpAddr, Ipv4Addr};

use axum::Json;
use axum::extract::State;

use servoswitch_app::ports::{Actuator, NetworkProvisioner};
use servoswitch_domain::configuration::DeviceSnapshot;
use servoswitch_domain::time::TimeInfo;

use crate::state::AppState;

/// `/status`
pub async fn status<A, N>(State(state): State<AppState<A, N>>) -> Json<DeviceSnapshot>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    Json(state.device.snapshot().await)
}

/// `/timeinfo`
pub async fn time_info<A, N>(State(state): State<AppState<A, N>>) -> Json<TimeInfo>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    Json(state.device.time_info().await)
}

/// `/ip`: the unspecified address while not associated.
pub async fn ip<A, N>(State(state): State<AppState<A, N>>) -> String
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state
        .device
        .local_ip()
        .await
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .to_string()
}
