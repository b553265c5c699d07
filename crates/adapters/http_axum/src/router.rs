//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use servoswitch_app::ports::{Actuator, NetworkProvisioner};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the command surface at the root, as the device's web UI expects.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<A, N>(state: AppState<A, N>) -> Router
where
    A: Actuator + Send + Sync + 'static,
    N: NetworkProvisioner + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
