//! # servoswitchd
//!
//! Composition root that wires the adapters together and starts the switch.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars)
//! - Initialise logging
//! - Open the servo, provisioner and clock backends
//! - Synchronise the boot time once, then home the servo to the off angle
//! - Spawn the control loop that runs deferred provisioning
//! - Serve the HTTP command surface until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no device logic belongs here.

mod backends;
mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use servoswitch_adapter_http_axum::state::AppState;
use servoswitch_app::control_loop::ControlLoop;
use servoswitch_app::device::Device;
use servoswitch_domain::action::ProvisioningState;

use crate::backends::{ClockBackend, ProvisionerBackend, ServoBackend};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("cannot load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Backends
    let servo = ServoBackend::open(&config.actuator)
        .await
        .context("cannot open servo")?;
    let network = ProvisionerBackend::from_config(&config.network);
    let clock = ClockBackend::from_config(&config.time);

    let device = Arc::new(
        Device::new(
            config.device_configuration()?,
            servo,
            network,
            config.portal_timeout(),
        )
        .with_flush_window(config.tick()),
    );

    // Startup
    match device.synchronise_time(&clock, config.sync_policy()).await {
        Ok(boot) => tracing::info!(%boot, "boot time synchronised"),
        Err(err) => tracing::warn!(error = %err, "boot time stays unsynced"),
    }
    if let Err(err) = device.home().await {
        tracing::error!(error = %err, "cannot home servo");
    }

    // Control loop
    tokio::spawn(log_provisioning(device.watch_provisioning()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let control_loop =
        tokio::spawn(ControlLoop::new(Arc::clone(&device), config.tick()).run(shutdown_rx));

    // HTTP
    let app = servoswitch_adapter_http_axum::router::build(AppState::from_arc(device));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "servoswitchd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    control_loop.await?;
    tracing::info!("servoswitchd stopped");

    Ok(())
}

async fn log_provisioning(mut states: watch::Receiver<ProvisioningState>) {
    while states.changed().await.is_ok() {
        let state = *states.borrow_and_update();
        tracing::info!(%state, "provisioning state changed");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
