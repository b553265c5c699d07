//! HTTP error response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use servoswitch_domain::error::{ServoSwitchError, ValidationError};

/// Maps [`ServoSwitchError`] to a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError(ServoSwitchError);

impl From<ServoSwitchError> for ApiError {
    fn from(err: ServoSwitchError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(ServoSwitchError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            ServoSwitchError::Validation(err) => {
                tracing::debug!(reason = %err, "command rejected");
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            ServoSwitchError::Hardware(err)
            | ServoSwitchError::Network(err)
            | ServoSwitchError::TimeSource(err) => {
                tracing::error!(error = %self.0, source = %err, "command failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
                    .into_response()
            }
        }
    }
}
