//! Wi-Fi provisioning through external commands.

use std::net::{IpAddr, UdpSocket};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use servoswitch_app::ports::NetworkProvisioner;
use servoswitch_domain::action::PortalOutcome;
use servoswitch_domain::error::ServoSwitchError;

use crate::config::CommandProvisionerConfig;
use crate::error::LinuxAdapterError;

/// Runs one configured command per provisioning step.
#[derive(Debug, Clone)]
pub struct CommandProvisioner {
    config: CommandProvisionerConfig,
}

impl CommandProvisioner {
    #[must_use]
    pub fn new(config: CommandProvisionerConfig) -> Self {
        Self { config }
    }

    async fn run(step: &'static str, argv: &[String]) -> Result<(), LinuxAdapterError> {
        let mut command = build(step, argv)?;
        let rendered = argv.join(" ");
        tracing::debug!(step, command = %rendered, "running provisioning command");

        let output = command
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| LinuxAdapterError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LinuxAdapterError::CommandStatus {
                command: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

fn build(step: &'static str, argv: &[String]) -> Result<Command, LinuxAdapterError> {
    let (program, args) = argv
        .split_first()
        .ok_or(LinuxAdapterError::EmptyCommand(step))?;
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    Ok(command)
}

impl NetworkProvisioner for CommandProvisioner {
    async fn disconnect_and_forget(&self) -> Result<(), ServoSwitchError> {
        Self::run("disconnect", &self.config.disconnect).await?;
        Ok(())
    }

    async fn reset_settings(&self) -> Result<(), ServoSwitchError> {
        Self::run("reset", &self.config.reset).await?;
        Ok(())
    }

    async fn run_portal(&self, timeout: Duration) -> Result<PortalOutcome, ServoSwitchError> {
        let rendered = self.config.portal.join(" ");
        let mut child = build("portal", &self.config.portal)?
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LinuxAdapterError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        let waited = tokio::time::timeout(timeout, child.wait()).await;
        match waited {
            Ok(Ok(status)) if status.success() => Ok(PortalOutcome::Configured),
            Ok(Ok(status)) => Err(LinuxAdapterError::CommandStatus {
                command: rendered,
                status,
                stderr: String::new(),
            }
            .into()),
            Ok(Err(source)) => Err(LinuxAdapterError::Spawn {
                command: rendered,
                source,
            }
            .into()),
            Err(_) => {
                if let Err(err) = child.kill().await {
                    tracing::warn!(error = %err, "cannot stop configuration portal");
                }
                Ok(PortalOutcome::TimedOut)
            }
        }
    }

    fn local_ip(&self) -> Option<IpAddr> {
        // connecting a UDP socket only selects a route; nothing is sent
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect(&self.config.route_address).ok()?;
        let ip = socket.local_addr().ok()?.ip();
        (!ip.is_unspecified()).then_some(ip)
    }
}
