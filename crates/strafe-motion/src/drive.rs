use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use strafe_kinematics::{MecanumKinematics, Pose2, Pose2Dual, PoseVelocity2, PoseVelocity2Dual};
use tracing::{error, warn};

use crate::controller::HolonomicController;
use crate::error::{MotionError, Result};
use crate::feedforward::{MotorFeedforward, normalize_powers, wheel_powers};
use crate::hardware::{DriveMotors, VoltageSource};
use crate::localizer::Localizer;
use crate::params::DriveParams;
use crate::telemetry::{DriveSample, TelemetrySink};

/// Number of past pose estimates kept for display.
pub const POSE_HISTORY_CAPACITY: usize = 100;

/// The drivetrain: pose estimate, controller, and the hardware it commands.
///
/// Actions receive a [`SharedDrive`] when they are built; only one
/// drive-related action should be active at a time since they all write the
/// same motors.
pub struct MecanumDrive {
    kinematics: MecanumKinematics,
    controller: HolonomicController,
    feedforward: MotorFeedforward,
    localizer: Box<dyn Localizer>,
    motors: Box<dyn DriveMotors>,
    voltage: Box<dyn VoltageSource>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    pose: Pose2,
    pose_history: VecDeque<Pose2>,
}

pub type SharedDrive = Arc<Mutex<MecanumDrive>>;

impl MecanumDrive {
    /// # Errors
    ///
    /// Returns an error if `params` describe an invalid drive geometry.
    pub fn new(
        params: &DriveParams,
        localizer: impl Localizer + 'static,
        motors: impl DriveMotors + 'static,
        voltage: impl VoltageSource + 'static,
        pose: Pose2,
    ) -> Result<Self> {
        Ok(MecanumDrive {
            kinematics: params.kinematics()?,
            controller: HolonomicController::new(params.gains()),
            feedforward: params.feedforward(),
            localizer: Box::new(localizer),
            motors: Box::new(motors),
            voltage: Box::new(voltage),
            telemetry: None,
            pose,
            pose_history: VecDeque::with_capacity(POSE_HISTORY_CAPACITY + 1),
        })
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn into_shared(self) -> SharedDrive {
        Arc::new(Mutex::new(self))
    }

    pub fn pose(&self) -> Pose2 {
        self.pose
    }

    /// Overwrite the pose estimate, e.g. at the start of a routine.
    pub fn set_pose(&mut self, pose: Pose2) {
        self.pose = pose;
    }

    /// Recent pose estimates, oldest first.
    pub fn pose_history(&self) -> impl Iterator<Item = &Pose2> {
        self.pose_history.iter()
    }

    pub fn kinematics(&self) -> &MecanumKinematics {
        &self.kinematics
    }

    /// Integrate the next localizer increment into the pose estimate.
    ///
    /// # Returns
    ///
    /// The current body-frame velocity estimate.
    pub fn update_pose_estimate(&mut self) -> Result<PoseVelocity2> {
        let twist = self.localizer.update()?;
        self.pose = self.pose.plus(twist.value());

        self.pose_history.push_back(self.pose);
        while self.pose_history.len() > POSE_HISTORY_CAPACITY {
            self.pose_history.pop_front();
        }
        self.publish(DriveSample::EstimatedPose(self.pose));

        let velocity: PoseVelocity2Dual<1> = twist.velocity();
        Ok(velocity.value())
    }

    /// Open-loop drive from a body velocity request in power units, as used
    /// for manual control. Powers are computed at unit geometry and scaled
    /// down only if one would exceed full power.
    pub fn set_drive_powers(&mut self, request: PoseVelocity2) -> Result<()> {
        let wheels = MecanumKinematics::unit()
            .inverse(PoseVelocity2Dual::<1>::constant(request))
            .map(|w| w.value());
        let powers = normalize_powers(wheels);
        self.motors.set_powers(powers)
    }

    /// One closed-loop tracking step toward `target`.
    ///
    /// Refreshes the pose estimate, runs the controller, maps the command
    /// through inverse kinematics and the motor model, and writes the wheel
    /// powers. If any step fails the wheels are zeroed before the error is
    /// returned.
    pub fn follow_step(&mut self, target: Pose2Dual<3>) -> Result<()> {
        let result = self.track(target);
        if let Err(cause) = &result {
            self.halt(cause);
        }
        result
    }

    fn track(&mut self, target: Pose2Dual<3>) -> Result<()> {
        let target_pose = target.value();
        self.publish(DriveSample::TargetPose(target_pose));

        let robot_vel = self.update_pose_estimate()?;
        let command = self.controller.compute(target, self.pose, robot_vel);
        self.publish(DriveSample::DriveCommand(command));

        let wheel_vels = self.kinematics.inverse(command);
        let voltage = self.voltage.voltage()?;
        let powers = wheel_powers(&self.feedforward, wheel_vels, voltage)?;
        self.publish(DriveSample::MecanumCommand { voltage, powers });
        self.motors.set_powers(powers)?;

        let error = target_pose.minus(self.pose);
        self.publish(DriveSample::TrackingError {
            x: error.position.x,
            y: error.position.y,
            heading_deg: error.heading.log().to_degrees(),
        });
        Ok(())
    }

    /// Zero every wheel.
    pub fn stop(&mut self) -> Result<()> {
        self.motors.stop()
    }

    /// Best-effort stop after a failed tick. A failure to stop is logged, the
    /// original error is what the caller sees.
    pub fn halt(&mut self, cause: &MotionError) {
        warn!(%cause, pose = %self.pose, "drive tick failed, zeroing wheel powers");
        if let Err(stop_err) = self.motors.stop() {
            error!(%stop_err, "failed to zero wheel powers");
        }
    }

    fn publish(&self, sample: DriveSample) {
        if let Some(sink) = &self.telemetry {
            sink.publish(sample);
        }
    }
}

impl std::fmt::Debug for MecanumDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MecanumDrive")
            .field("kinematics", &self.kinematics)
            .field("controller", &self.controller)
            .field("pose", &self.pose)
            .field("history_len", &self.pose_history.len())
            .finish_non_exhaustive()
    }
}
