//! Actuator controller: turns a validated target into servo commands and
//! sequences the auto-reset.

use std::time::Duration;

use servoswitch_domain::angle::Angle;
use servoswitch_domain::configuration::DeviceConfiguration;
use servoswitch_domain::error::ServoSwitchError;

use crate::ports::Actuator;

/// Wait between the commanded move and the auto-reset move.
///
/// Long enough for a typical hobby servo to sweep the full 180°.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Application service driving the [`Actuator`] port.
pub struct ActuatorController<A> {
    actuator: A,
}

impl<A: Actuator> ActuatorController<A> {
    /// Create a new controller for the given actuator.
    pub fn new(actuator: A) -> Self {
        Self { actuator }
    }

    /// Access the underlying actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Move to `raw_target` and record `light_on` as the logical state.
    ///
    /// When auto-reset is enabled at the time of the call, the servo is sent
    /// back to the auto-reset angle after [`SETTLE_DELAY`]. The second move
    /// is issued even when both angles are equal. The recorded light state is
    /// the commanded one, not the physical position after the reset. A
    /// failing reset move is logged and does not fail the command, since the
    /// commanded actuation already happened.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Validation`] if `raw_target` is outside
    /// `[0, 180]`, in which case nothing moves and nothing is recorded.
    /// Returns [`ServoSwitchError::Hardware`] if the move to `raw_target`
    /// fails, in which case the light state is left unchanged.
    #[tracing::instrument(skip(self, config))]
    pub async fn apply(
        &self,
        config: &mut DeviceConfiguration,
        raw_target: i64,
        light_on: bool,
    ) -> Result<Angle, ServoSwitchError> {
        let target = Angle::try_from(raw_target)?;

        self.actuator.move_to(target).await?;
        config.set_light_on(light_on);
        tracing::info!(%target, light_on, "servo moved");

        if config.auto_reset_enabled() {
            let reset = config.auto_reset_angle();
            tokio::time::sleep(SETTLE_DELAY).await;
            match self.actuator.move_to(reset).await {
                Ok(()) => tracing::debug!(%reset, "servo auto-reset"),
                Err(err) => tracing::warn!(error = %err, %reset, "servo auto-reset failed"),
            }
        }

        Ok(target)
    }

    /// Park the servo at the configured off angle.
    ///
    /// Called once at startup; the logical light state is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`ServoSwitchError::Hardware`] if the actuator fails.
    #[tracing::instrument(skip(self, config))]
    pub async fn home(&self, config: &DeviceConfiguration) -> Result<Angle, ServoSwitchError> {
        let off = config.off_angle();
        self.actuator.move_to(off).await?;
        Ok(off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servoswitch_domain::error::ValidationError;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct RecordingServo {
        moves: Mutex<Vec<(Instant, Angle)>>,
    }

    impl RecordingServo {
        fn positions(&self) -> Vec<u8> {
            self.moves
                .lock()
                .unwrap()
                .iter()
                .map(|(_, angle)| angle.degrees())
                .collect()
        }
    }

    impl Actuator for RecordingServo {
        fn move_to(
            &self,
            angle: Angle,
        ) -> impl Future<Output = Result<(), ServoSwitchError>> + Send {
            self.moves.lock().unwrap().push((Instant::now(), angle));
            async { Ok(()) }
        }
    }

    struct JammedServo;

    impl Actuator for JammedServo {
        async fn move_to(&self, _angle: Angle) -> Result<(), ServoSwitchError> {
            Err(ServoSwitchError::Hardware("servo jammed".into()))
        }
    }

    /// Accepts the first move, then jams.
    #[derive(Default)]
    struct JamsAfterFirstMove {
        moves: Mutex<u32>,
    }

    impl Actuator for JamsAfterFirstMove {
        async fn move_to(&self, _angle: Angle) -> Result<(), ServoSwitchError> {
            let mut moves = self.moves.lock().unwrap();
            *moves += 1;
            if *moves > 1 {
                return Err(ServoSwitchError::Hardware("servo jammed".into()));
            }
            Ok(())
        }
    }

    fn angle(degrees: u8) -> Angle {
        Angle::new(degrees).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn should_move_once_when_auto_reset_disabled() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();

        let target = controller.apply(&mut config, 90, true).await.unwrap();

        assert_eq!(target, angle(90));
        assert_eq!(controller.actuator().positions(), vec![90]);
        assert!(config.light_on());
    }

    #[tokio::test(start_paused = true)]
    async fn should_return_to_reset_angle_after_settle_delay() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();
        config.set_auto_reset_enabled(true);
        config.set_auto_reset_angle(45).unwrap();

        controller.apply(&mut config, 90, true).await.unwrap();

        let moves = controller.actuator().moves.lock().unwrap().clone();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].1, angle(90));
        assert_eq!(moves[1].1, angle(45));
        assert_eq!(moves[1].0 - moves[0].0, SETTLE_DELAY);
        assert!(config.light_on());
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_commanded_state_not_reset_position() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();
        config.set_auto_reset_enabled(true);
        config.set_light_on(true);

        controller.apply(&mut config, 0, false).await.unwrap();

        assert_eq!(controller.actuator().positions(), vec![0, 45]);
        assert!(!config.light_on());
    }

    #[tokio::test(start_paused = true)]
    async fn should_succeed_when_only_the_reset_move_fails() {
        let controller = ActuatorController::new(JamsAfterFirstMove::default());
        let mut config = DeviceConfiguration::default();
        config.set_auto_reset_enabled(true);

        let target = controller.apply(&mut config, 120, true).await.unwrap();

        assert_eq!(target, angle(120));
        assert_eq!(*controller.actuator().moves.lock().unwrap(), 2);
        assert!(config.light_on());
    }

    #[tokio::test(start_paused = true)]
    async fn should_still_issue_reset_when_angles_are_equal() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();
        config.set_auto_reset_enabled(true);
        config.set_auto_reset_angle(90).unwrap();

        controller.apply(&mut config, 90, true).await.unwrap();

        assert_eq!(controller.actuator().positions(), vec![90, 90]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_invalid_angle_without_moving() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();
        config.set_auto_reset_enabled(true);
        let before = config.clone();

        for raw in [-1, 181, 1_000] {
            let result = controller.apply(&mut config, raw, true).await;
            assert!(matches!(
                result,
                Err(ServoSwitchError::Validation(ValidationError::InvalidAngle))
            ));
        }

        assert!(controller.actuator().positions().is_empty());
        assert_eq!(config, before);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_light_state_when_actuator_fails() {
        let controller = ActuatorController::new(JammedServo);
        let mut config = DeviceConfiguration::default();

        let result = controller.apply(&mut config, 90, true).await;

        assert!(matches!(result, Err(ServoSwitchError::Hardware(_))));
        assert!(!config.light_on());
    }

    #[tokio::test]
    async fn should_home_to_off_angle() {
        let controller = ActuatorController::new(RecordingServo::default());
        let mut config = DeviceConfiguration::default();
        config.set_off_angle(10).unwrap();

        let homed = controller.home(&config).await.unwrap();

        assert_eq!(homed, angle(10));
        assert_eq!(controller.actuator().positions(), vec![10]);
        assert!(!config.light_on());
    }
}
