//! Plain-text command handlers.

use axum::extract::{Query, State};

use servoswitch_app::ports::{Actuator, NetworkProvisioner};
use servoswitch_domain::action::Offer;
use servoswitch_domain::configuration::parse_enable_flag;
use servoswitch_domain::error::ValidationError;

use crate::api::{AngleQuery, EnableQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// `/turnLightOn?angle=N`
pub async fn turn_light_on<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<AngleQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state.device.turn_light_on(query.required()?).await?;
    Ok("ON")
}

/// `/turnLightOff?angle=N`
pub async fn turn_light_off<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<AngleQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state.device.turn_light_off(query.required()?).await?;
    Ok("OFF")
}

/// `/setOnAngle?angle=N`
pub async fn set_on_angle<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<AngleQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state.device.set_on_angle(query.required()?).await?;
    Ok("OK")
}

/// `/setOffAngle?angle=N`
pub async fn set_off_angle<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<AngleQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state.device.set_off_angle(query.required()?).await?;
    Ok("OK")
}

/// `/setAutoResetAngle?angle=N`
pub async fn set_auto_reset_angle<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<AngleQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    state.device.set_auto_reset_angle(query.required()?).await?;
    Ok("OK")
}

/// `/toggleAutoReset?enable=true|…`
pub async fn toggle_auto_reset<A, N>(
    State(state): State<AppState<A, N>>,
    Query(query): Query<EnableQuery>,
) -> Result<&'static str, ApiError>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    let raw = query
        .enable
        .as_deref()
        .ok_or(ValidationError::MissingParameter("enable"))?;
    let enabled = parse_enable_flag(raw);
    state.device.set_auto_reset_enabled(enabled).await;
    Ok(if enabled { "Enabled" } else { "Disabled" })
}

/// `/disconnectAndConfigureWifi`
///
/// Only queues the request; the control loop tears the network down after
/// this response went out.
pub async fn disconnect_and_configure_wifi<A, N>(
    State(state): State<AppState<A, N>>,
) -> &'static str
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    if state.device.request_reconfiguration().await == Offer::AlreadyPending {
        tracing::debug!(
            state = %state.device.provisioning_state(),
            "network reconfiguration already pending"
        );
    }
    "OK"
}
