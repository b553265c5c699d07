//! Shared device state: the single owner of configuration, actuator,
//! provisioning and time base.
//!
//! Every command goes through one FIFO lock, so commands are applied one at
//! a time in arrival order. The auto-reset settle delay and the
//! configuration portal both hold the lock; commands arriving meanwhile wait
//! their turn.

use std::net::IpAddr;
use std::time::Duration;

use tokio::sync::{Mutex, watch};

use servoswitch_domain::action::{Offer, ProvisioningState};
use servoswitch_domain::angle::Angle;
use servoswitch_domain::configuration::{DeviceConfiguration, DeviceSnapshot};
use servoswitch_domain::error::ServoSwitchError;
use servoswitch_domain::time::{TimeInfo, TimeSyncUnavailable, Timestamp};

use crate::ports::{Actuator, NetworkProvisioner, TimeSource};
use crate::services::actuator_controller::ActuatorController;
use crate::services::provisioning::{PollResult, ProvisioningCoordinator};
use crate::services::time_base::{SyncPolicy, TimeBase};

struct DeviceContext<A, N> {
    configuration: DeviceConfiguration,
    actuator: ActuatorController<A>,
    provisioning: ProvisioningCoordinator<N>,
    time: TimeBase,
}

/// The device core, shared between the HTTP surface and the control loop.
pub struct Device<A, N> {
    context: Mutex<DeviceContext<A, N>>,
    provisioning_state: watch::Receiver<ProvisioningState>,
}

impl<A, N> Device<A, N>
where
    A: Actuator + Send + Sync,
    N: NetworkProvisioner + Send + Sync,
{
    /// Assemble a device. Uptime starts counting now.
    pub fn new(
        configuration: DeviceConfiguration,
        actuator: A,
        provisioner: N,
        portal_timeout: Duration,
    ) -> Self {
        let provisioning = ProvisioningCoordinator::new(provisioner, portal_timeout);
        let provisioning_state = provisioning.subscribe();
        Self {
            context: Mutex::new(DeviceContext {
                configuration,
                actuator: ActuatorController::new(actuator),
                provisioning,
                time: TimeBase::start(),
            }),
            provisioning_state,
        }
    }

    /// Leave at least `flush_window` between a reconfiguration request and
    /// the network teardown. Usually the control-loop tick.
    #[must_use]
    pub fn with_flush_window(mut self, flush_window: Duration) -> Self {
        self.context
            .get_mut()
            .provisioning
            .set_flush_window(flush_window);
        self
    }

    /// Subscribe to provisioning state changes.
    #[must_use]
    pub fn watch_provisioning(&self) -> watch::Receiver<ProvisioningState> {
        self.provisioning_state.clone()
    }

    /// Move to `raw` and record the light as on.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] when `raw` is outside
    /// `[0, 180]`, or [`ServoSwitchError::Hardware`] if the actuator fails.
    pub async fn turn_light_on(&self, raw: i64) -> Result<Angle, ServoSwitchError> {
        let mut guard = self.context.lock().await;
        let ctx = &mut *guard;
        ctx.actuator.apply(&mut ctx.configuration, raw, true).await
    }

    /// Move to `raw` and record the light as off.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] when `raw` is outside
    /// `[0, 180]`, or [`ServoSwitchError::Hardware`] if the actuator fails.
    pub async fn turn_light_off(&self, raw: i64) -> Result<Angle, ServoSwitchError> {
        let mut guard = self.context.lock().await;
        let ctx = &mut *guard;
        ctx.actuator.apply(&mut ctx.configuration, raw, false).await
    }

    /// Store a new on angle. The servo does not move.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] when `raw` is outside
    /// `[0, 180]`; the stored angle is unchanged in that case.
    pub async fn set_on_angle(&self, raw: i64) -> Result<Angle, ServoSwitchError> {
        let mut ctx = self.context.lock().await;
        let angle = ctx.configuration.set_on_angle(raw)?;
        tracing::info!(%angle, "on angle updated");
        Ok(angle)
    }

    /// Store a new off angle. The servo does not move.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] when `raw` is outside
    /// `[0, 180]`; the stored angle is unchanged in that case.
    pub async fn set_off_angle(&self, raw: i64) -> Result<Angle, ServoSwitchError> {
        let mut ctx = self.context.lock().await;
        let angle = ctx.configuration.set_off_angle(raw)?;
        tracing::info!(%angle, "off angle updated");
        Ok(angle)
    }

    /// Store a new auto-reset angle. The servo does not move.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] when `raw` is outside
    /// `[0, 180]`.
    pub async fn set_auto_reset_angle(&self, raw: i64) -> Result<Angle, ServoSwitchError> {
        let mut ctx = self.context.lock().await;
        let angle = ctx.configuration.set_auto_reset_angle(raw)?;
        tracing::info!(%angle, "auto-reset angle updated");
        Ok(angle)
    }

    pub async fn set_auto_reset_enabled(&self, enabled: bool) {
        let mut ctx = self.context.lock().await;
        ctx.configuration.set_auto_reset_enabled(enabled);
        tracing::info!(enabled, "auto-reset toggled");
    }

    pub async fn snapshot(&self) -> DeviceSnapshot {
        self.context.lock().await.configuration.snapshot()
    }

    pub async fn time_info(&self) -> TimeInfo {
        self.context.lock().await.time.now()
    }

    /// Queue a network re-provisioning for a later control-loop iteration.
    pub async fn request_reconfiguration(&self) -> Offer {
        self.context
            .lock()
            .await
            .provisioning
            .request_reconfiguration()
    }

    pub async fn local_ip(&self) -> Option<IpAddr> {
        self.context
            .lock()
            .await
            .provisioning
            .provisioner()
            .local_ip()
    }

    /// Latest provisioning state, readable without waiting for the lock.
    #[must_use]
    pub fn provisioning_state(&self) -> ProvisioningState {
        *self.provisioning_state.borrow()
    }

    /// Park the servo at the off angle.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Hardware`] if the actuator fails.
    pub async fn home(&self) -> Result<Angle, ServoSwitchError> {
        let ctx = self.context.lock().await;
        ctx.actuator.home(&ctx.configuration).await
    }

    /// Learn the boot wall-clock time. Only the first call contacts `source`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSyncUnavailable`] when the sync did not complete.
    pub async fn synchronise_time<S: TimeSource + Sync>(
        &self,
        source: &S,
        policy: SyncPolicy,
    ) -> Result<Timestamp, TimeSyncUnavailable> {
        self.context
            .lock()
            .await
            .time
            .synchronise(source, policy)
            .await
    }

    /// Run deferred work that became due. Called once per control-loop tick.
    pub async fn poll_deferred(&self) -> PollResult {
        self.context.lock().await.provisioning.poll_and_run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provisioning::DEFAULT_FLUSH_WINDOW;
    use servoswitch_domain::action::PortalOutcome;
    use servoswitch_domain::error::ValidationError;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingServo {
        moves: StdMutex<Vec<(Instant, u8)>>,
    }

    impl RecordingServo {
        fn positions(&self) -> Vec<u8> {
            self.moves.lock().unwrap().iter().map(|(_, a)| *a).collect()
        }
    }

    impl Actuator for RecordingServo {
        async fn move_to(&self, angle: Angle) -> Result<(), ServoSwitchError> {
            self.moves
                .lock()
                .unwrap()
                .push((Instant::now(), angle.degrees()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct QuietNetwork {
        portals: StdMutex<u32>,
    }

    impl NetworkProvisioner for QuietNetwork {
        async fn disconnect_and_forget(&self) -> Result<(), ServoSwitchError> {
            Ok(())
        }

        async fn reset_settings(&self) -> Result<(), ServoSwitchError> {
            Ok(())
        }

        async fn run_portal(&self, _timeout: Duration) -> Result<PortalOutcome, ServoSwitchError> {
            *self.portals.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(PortalOutcome::Configured)
        }

        fn local_ip(&self) -> Option<IpAddr> {
            Some(IpAddr::from([192, 168, 1, 42]))
        }
    }

    type TestDevice = Device<Arc<RecordingServo>, Arc<QuietNetwork>>;

    fn device() -> (TestDevice, Arc<RecordingServo>, Arc<QuietNetwork>) {
        let servo = Arc::new(RecordingServo::default());
        let network = Arc::new(QuietNetwork::default());
        let device = Device::new(
            DeviceConfiguration::default(),
            Arc::clone(&servo),
            Arc::clone(&network),
            Duration::from_secs(180),
        );
        (device, servo, network)
    }

    #[tokio::test(start_paused = true)]
    async fn should_turn_light_on_and_off() {
        let (device, servo, _) = device();

        assert_eq!(device.turn_light_on(90).await.unwrap().degrees(), 90);
        assert!(device.snapshot().await.light_on);

        assert_eq!(device.turn_light_off(10).await.unwrap().degrees(), 10);
        assert!(!device.snapshot().await.light_on);
        assert_eq!(servo.positions(), vec![90, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_store_angles_without_moving() {
        let (device, servo, _) = device();

        device.set_on_angle(120).await.unwrap();
        device.set_off_angle(10).await.unwrap();

        let snapshot = device.snapshot().await;
        assert_eq!(snapshot.on_angle.degrees(), 120);
        assert_eq!(snapshot.off_angle.degrees(), 10);
        assert!(!snapshot.light_on);
        assert!(servo.positions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_out_of_range_angle_without_side_effects() {
        let (device, servo, _) = device();
        let before = device.snapshot().await;

        assert!(matches!(
            device.set_off_angle(200).await,
            Err(ServoSwitchError::Validation(ValidationError::InvalidAngle))
        ));
        assert!(matches!(
            device.turn_light_on(-5).await,
            Err(ServoSwitchError::Validation(ValidationError::InvalidAngle))
        ));

        assert_eq!(device.snapshot().await, before);
        assert!(servo.positions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_store_auto_reset_angle_without_moving() {
        let (device, servo, _) = device();

        device.set_auto_reset_angle(60).await.unwrap();

        assert_eq!(device.snapshot().await.auto_reset_angle.degrees(), 60);
        assert!(servo.positions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_use_latest_toggle_for_next_command() {
        let (device, servo, _) = device();
        device.set_auto_reset_enabled(true).await;
        device.turn_light_on(90).await.unwrap();
        device.set_auto_reset_enabled(false).await;
        device.turn_light_off(0).await.unwrap();

        assert_eq!(servo.positions(), vec![90, 45, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_serialize_concurrent_commands() {
        let (device, servo, _) = device();
        device.set_auto_reset_enabled(true).await;

        let (first, second) = tokio::join!(device.turn_light_on(90), device.turn_light_off(0));
        first.unwrap();
        second.unwrap();

        // each command finishes its reset before the next one starts
        assert_eq!(servo.positions(), vec![90, 45, 0, 45]);
        let moves = servo.moves.lock().unwrap().clone();
        assert!(moves[2].0 >= moves[1].0);
        assert!(!device.snapshot().await.light_on);
    }

    #[tokio::test(start_paused = true)]
    async fn should_queue_reconfiguration_and_run_on_later_tick() {
        let (device, _, network) = device();

        assert_eq!(device.request_reconfiguration().await, Offer::Queued);
        assert_eq!(device.request_reconfiguration().await, Offer::AlreadyPending);
        assert_eq!(device.provisioning_state(), ProvisioningState::PendingTrigger);

        assert_eq!(device.poll_deferred().await, PollResult::Nothing);
        assert_eq!(*network.portals.lock().unwrap(), 0);

        tokio::time::advance(DEFAULT_FLUSH_WINDOW).await;
        assert_eq!(
            device.poll_deferred().await,
            PollResult::Completed(PortalOutcome::Configured)
        );
        assert_eq!(*network.portals.lock().unwrap(), 1);
        assert_eq!(device.provisioning_state(), ProvisioningState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_expose_local_ip_and_time() {
        let (device, _, _) = device();
        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(device.local_ip().await, Some(IpAddr::from([192, 168, 1, 42])));
        let info = device.time_info().await;
        assert_eq!(info.uptime, "00:01:30");
        assert_eq!(info.boot_time, servoswitch_domain::time::UNSYNCED);
    }

    #[tokio::test(start_paused = true)]
    async fn should_home_to_off_angle_without_changing_light_state() {
        let (device, servo, _) = device();

        device.home().await.unwrap();

        assert_eq!(servo.positions(), vec![0]);
        assert!(!device.snapshot().await.light_on);
    }
}
