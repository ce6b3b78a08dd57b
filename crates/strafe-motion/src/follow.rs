use std::time::Instant;

use tracing::debug;

use crate::action::Action;
use crate::drive::SharedDrive;
use crate::error::{MotionError, Result};
use crate::trajectory::{TimeTrajectory, TimeTurn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    NotStarted,
    Running { begin: Instant },
    Complete,
}

/// Tracks a time-indexed segment with the drive's feedback controller.
///
/// The clock starts on the first tick. Every tick before the segment's
/// duration has elapsed runs one [`follow_step`](crate::MecanumDrive::follow_step);
/// the first tick at or past it zeroes the wheels and completes.
pub struct FollowTrajectoryAction<T> {
    drive: SharedDrive,
    trajectory: T,
    state: FollowState,
}

/// An in-place turn is followed the same way as any other segment.
pub type TurnAction = FollowTrajectoryAction<TimeTurn>;

impl<T: TimeTrajectory> FollowTrajectoryAction<T> {
    pub fn new(drive: SharedDrive, trajectory: T) -> Self {
        FollowTrajectoryAction { drive, trajectory, state: FollowState::NotStarted }
    }

    pub fn trajectory(&self) -> &T {
        &self.trajectory
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == FollowState::Complete
    }
}

impl<T: TimeTrajectory> Action for FollowTrajectoryAction<T> {
    fn tick(&mut self, now: Instant) -> Result<bool> {
        let begin = match self.state {
            FollowState::NotStarted => {
                debug!(duration = self.trajectory.duration(), "trajectory started");
                self.state = FollowState::Running { begin: now };
                now
            }
            FollowState::Running { begin } => begin,
            FollowState::Complete => {
                return Err(MotionError::ActionMisuse("trajectory ticked after completion"));
            }
        };

        let t = now.saturating_duration_since(begin).as_secs_f64();
        let mut drive = self.drive.lock();
        if t >= self.trajectory.duration() {
            self.state = FollowState::Complete;
            drive.stop()?;
            debug!(pose = %drive.pose(), "trajectory complete");
            return Ok(false);
        }

        drive.follow_step(self.trajectory.get(t))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MecanumDrive;
    use crate::params::DriveParams;
    use crate::telemetry::DriveSample;
    use crate::testing::{FixedVoltage, RecordingMotors, RecordingSink, ScriptedLocalizer};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use strafe_kinematics::{Pose2, Pose2Dual, WheelState};

    /// Constant target that records the times it was sampled at.
    struct Probe {
        duration: f64,
        target: Pose2,
        sampled: Arc<Mutex<Vec<f64>>>,
    }

    impl TimeTrajectory for Probe {
        fn duration(&self) -> f64 {
            self.duration
        }

        fn get(&self, t: f64) -> Pose2Dual<3> {
            self.sampled.lock().push(t);
            Pose2Dual::constant(self.target)
        }
    }

    fn setup(duration: f64) -> (FollowTrajectoryAction<Probe>, RecordingMotors, Arc<Mutex<Vec<f64>>>) {
        let motors = RecordingMotors::default();
        let drive = MecanumDrive::new(
            &DriveParams::default(),
            ScriptedLocalizer::default(),
            motors.clone(),
            FixedVoltage(12.0),
            Pose2::identity(),
        )
        .unwrap()
        .into_shared();
        let sampled = Arc::new(Mutex::new(Vec::new()));
        let probe = Probe { duration, target: Pose2::new(10.0, 0.0, 0.0), sampled: sampled.clone() };
        (FollowTrajectoryAction::new(drive, probe), motors, sampled)
    }

    #[test]
    fn test_runs_until_duration_elapses() {
        let (mut action, motors, sampled) = setup(2.0);
        let t0 = Instant::now();

        assert!(action.tick(t0).unwrap());
        assert!(matches!(action.state(), FollowState::Running { begin } if begin == t0));
        assert!(action.tick(t0 + Duration::from_millis(1990)).unwrap());
        assert_ne!(motors.last(), Some(WheelState::splat(0.0)));

        assert!(!action.tick(t0 + Duration::from_millis(2010)).unwrap());
        assert!(action.is_complete());
        assert_eq!(motors.last(), Some(WheelState::splat(0.0)));

        // Sampled at t = 0 on the first tick and never past the end
        let sampled = sampled.lock();
        assert_eq!(sampled.len(), 2);
        assert_eq!(sampled[0], 0.0);
        assert!((sampled[1] - 1.99).abs() < 1e-9);
    }

    #[test]
    fn test_first_tick_is_pure_position_feedback() {
        let params = DriveParams {
            axial_vel_gain: 2.0,
            lateral_vel_gain: 2.0,
            heading_vel_gain: 2.0,
            ..DriveParams::default()
        };
        let sink = Arc::new(RecordingSink::default());
        let drive = MecanumDrive::new(
            &params,
            ScriptedLocalizer::default(),
            RecordingMotors::default(),
            FixedVoltage(12.0),
            Pose2::identity(),
        )
        .unwrap()
        .with_telemetry(sink.clone())
        .into_shared();
        let sampled = Arc::new(Mutex::new(Vec::new()));
        let probe = Probe { duration: 1.0, target: Pose2::new(10.0, 0.0, 0.0), sampled };
        let mut action = FollowTrajectoryAction::new(drive, probe);

        assert!(action.tick(Instant::now()).unwrap());
        let command = sink
            .samples()
            .into_iter()
            .find_map(|s| match s {
                DriveSample::DriveCommand(c) => Some(c.value()),
                _ => None,
            })
            .unwrap();
        // Target and robot are both at rest, so only the 10 in axial error drives
        assert!((command.linear_vel.x - params.axial_gain * 10.0).abs() < 1e-9);
        assert!(command.linear_vel.y.abs() < 1e-9);
        assert!(command.ang_vel.abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_completes_without_power() {
        let (mut action, motors, sampled) = setup(0.0);
        assert!(!action.tick(Instant::now()).unwrap());
        assert!(sampled.lock().is_empty());
        assert_eq!(motors.count(), 1);
        assert_eq!(motors.last(), Some(WheelState::splat(0.0)));
    }

    #[test]
    fn test_tick_after_complete_is_misuse() {
        let (mut action, _, _) = setup(0.0);
        let now = Instant::now();
        action.tick(now).unwrap();
        assert!(matches!(action.tick(now), Err(MotionError::ActionMisuse(_))));
    }

    #[test]
    fn test_elapsed_time_measured_from_first_tick() {
        let (mut action, _, sampled) = setup(1.0);
        let first = Instant::now() + Duration::from_secs(30);
        assert!(action.tick(first).unwrap());
        assert!(action.tick(first + Duration::from_millis(500)).unwrap());
        assert!((sampled.lock()[1] - 0.5).abs() < 1e-9);
    }
}
