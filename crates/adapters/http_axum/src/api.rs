//! Command and telemetry handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod commands;
pub mod status;

use axum::Router;
use axum::routing::get;
use serde::Deserialize;

use servoswitch_app::ports::{Actuator, NetworkProvisioner};
use servoswitch_domain::error::ValidationError;

use crate::state::AppState;

/// Query string of the angle commands.
#[derive(Debug, Default, Deserialize)]
pub struct AngleQuery {
    pub angle: Option<String>,
}

impl AngleQuery {
    /// The `angle` argument as an integer.
    ///
    /// Range checking is left to the core.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingParameter`] when absent and
    /// [`ValidationError::InvalidAngle`] when not an integer.
    pub fn required(&self) -> Result<i64, ValidationError> {
        let raw = self
            .angle
            .as_deref()
            .ok_or(ValidationError::MissingParameter("angle"))?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidAngle)
    }
}

/// Query string of `/toggleAutoReset`.
#[derive(Debug, Default, Deserialize)]
pub struct EnableQuery {
    pub enable: Option<String>,
}

/// Build the command surface. Every route answers both `GET` and `POST`.
pub fn routes<A, N>() -> Router<AppState<A, N>>
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    Router::new()
        // Actuation
        .route(
            "/turnLightOn",
            get(commands::turn_light_on::<A, N>).post(commands::turn_light_on::<A, N>),
        )
        .route(
            "/turnLightOff",
            get(commands::turn_light_off::<A, N>).post(commands::turn_light_off::<A, N>),
        )
        // Configuration
        .route(
            "/setOnAngle",
            get(commands::set_on_angle::<A, N>).post(commands::set_on_angle::<A, N>),
        )
        .route(
            "/setOffAngle",
            get(commands::set_off_angle::<A, N>).post(commands::set_off_angle::<A, N>),
        )
        .route(
            "/setAutoResetAngle",
            get(commands::set_auto_reset_angle::<A, N>)
                .post(commands::set_auto_reset_angle::<A, N>),
        )
        .route(
            "/toggleAutoReset",
            get(commands::toggle_auto_reset::<A, N>).post(commands::toggle_auto_reset::<A, N>),
        )
        // Network
        .route(
            "/disconnectAndConfigureWifi",
            get(commands::disconnect_and_configure_wifi::<A, N>)
                .post(commands::disconnect_and_configure_wifi::<A, N>),
        )
        // Telemetry
        .route(
            "/status",
            get(status::status::<A, N>).post(status::status::<A, N>),
        )
        .route(
            "/timeinfo",
            get(status::time_info::<A, N>).post(status::time_info::<A, N>),
        )
        .route("/ip", get(status::ip::<A, N>).post(status::ip::<A, N>))
}
