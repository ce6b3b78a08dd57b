use strafe_kinematics::{Pose2, Rotation2, Vector2};
use tracing::debug;

use crate::action::{Action, BoxedAction, Parallel, Sequential, Sleep};
use crate::drive::SharedDrive;
use crate::error::{MotionError, Result};
use crate::follow::FollowTrajectoryAction;
use crate::params::DriveParams;
use crate::trajectory::{ProfileLimits, TimeStrafe, TimeTrajectory, TimeTurn};

/// Queues drive segments that chain end to start.
///
/// Segments are planned when they are queued, each from the end pose of the
/// previous one, so the whole routine is fixed before the first tick.
pub struct ActionBuilder {
    drive: SharedDrive,
    pose: Pose2,
    translation: ProfileLimits,
    rotation: ProfileLimits,
    actions: Vec<BoxedAction>,
    /// Whether any queued step commands the wheels.
    drives: bool,
}

impl ActionBuilder {
    pub fn new(drive: SharedDrive, begin: Pose2, translation: ProfileLimits, rotation: ProfileLimits) -> Self {
        ActionBuilder { drive, pose: begin, translation, rotation, actions: Vec::new(), drives: false }
    }

    pub fn from_params(drive: SharedDrive, begin: Pose2, params: &DriveParams) -> Self {
        ActionBuilder::new(drive, begin, params.translation_limits(), params.rotation_limits())
    }

    /// Translate to `end` keeping the current heading.
    pub fn strafe_to(self, end: Vector2) -> Result<Self> {
        let segment = TimeStrafe::new(self.pose, end, self.translation)?;
        Ok(self.follow(segment))
    }

    /// Rotate in place by `angle` (rad, counter-clockwise positive).
    pub fn turn(self, angle: f64) -> Result<Self> {
        let segment = TimeTurn::new(self.pose, angle, self.rotation)?;
        Ok(self.follow(segment))
    }

    /// Rotate in place the short way round to an absolute heading.
    pub fn turn_to(self, heading: f64) -> Result<Self> {
        let angle = Rotation2::exp(heading).minus(self.pose.heading);
        self.turn(angle)
    }

    pub fn wait(self, seconds: f64) -> Result<Self> {
        let sleep = Sleep::from_secs(seconds)?;
        Ok(self.then(sleep))
    }

    /// Append an arbitrary action. The planned pose is left unchanged.
    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(action.boxed());
        self
    }

    /// An empty builder planning from this one's current pose, for a branch
    /// that will run in parallel with others.
    pub fn fork(&self) -> Self {
        ActionBuilder::new(self.drive.clone(), self.pose, self.translation, self.rotation)
    }

    /// Run forked branches side by side as the next step.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidParameter)` if more than one branch
    /// moves the robot, since they would command the same wheels. A branch
    /// that drives away and back still counts as moving.
    pub fn join(mut self, branches: Vec<ActionBuilder>) -> Result<Self> {
        let mut driving = branches.iter().filter(|b| b.drives);
        if let Some(branch) = driving.next() {
            if driving.next().is_some() {
                return Err(MotionError::InvalidParameter("only one parallel branch may drive"));
            }
            self.pose = branch.pose;
            self.drives = true;
        }
        let children = branches.into_iter().map(|b| b.build().boxed()).collect();
        Ok(self.then(Parallel::new(children)))
    }

    /// Where the queued segments leave the robot.
    pub fn end_pose(&self) -> Pose2 {
        self.pose
    }

    pub fn build(self) -> Sequential {
        debug!(actions = self.actions.len(), end = %self.pose, "routine built");
        Sequential::new(self.actions)
    }

    fn follow<T: TimeTrajectory + 'static>(mut self, segment: T) -> Self {
        self.pose = segment.end_pose();
        self.drives = true;
        debug!(duration = segment.duration(), end = %self.pose, "segment queued");
        let action = FollowTrajectoryAction::new(self.drive.clone(), segment);
        self.then(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MecanumDrive;
    use crate::testing::{FixedVoltage, RecordingMotors, ScriptedLocalizer};
    use std::f64::consts::{FRAC_PI_2, PI};
    const EPSILON: f64 = 1e-9;

    fn builder(begin: Pose2) -> ActionBuilder {
        let params = DriveParams::default();
        let drive = MecanumDrive::new(
            &params,
            ScriptedLocalizer::default(),
            RecordingMotors::default(),
            FixedVoltage(12.0),
            begin,
        )
        .unwrap()
        .into_shared();
        ActionBuilder::from_params(drive, begin, &params)
    }

    #[test]
    fn test_segments_chain_end_to_start() {
        let b = builder(Pose2::new(0.0, 0.0, 0.0))
            .strafe_to(Vector2::new(24.0, 0.0))
            .unwrap()
            .turn(FRAC_PI_2)
            .unwrap()
            .strafe_to(Vector2::new(24.0, 24.0))
            .unwrap();
        let end = b.end_pose();
        assert!((end.position.x - 24.0).abs() < EPSILON);
        assert!((end.position.y - 24.0).abs() < EPSILON);
        assert!((end.heading.log() - FRAC_PI_2).abs() < EPSILON);
        assert_eq!(b.build().len(), 3);
    }

    #[test]
    fn test_turn_to_takes_short_way() {
        let b = builder(Pose2::new(0.0, 0.0, 0.75 * PI)).turn_to(-0.75 * PI).unwrap();
        // 0.75 pi to -0.75 pi is a half-pi turn counter-clockwise through pi
        assert!((b.end_pose().heading.log() + 0.75 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_wait_and_then_keep_pose() {
        let b = builder(Pose2::new(1.0, 2.0, 0.0)).wait(0.5).unwrap().then(Sleep::new(Default::default()));
        assert!((b.end_pose().position.x - 1.0).abs() < EPSILON);
        assert_eq!(b.build().len(), 2);
    }

    #[test]
    fn test_join_takes_pose_of_driving_branch() {
        let main = builder(Pose2::identity());
        let drive = main.fork().strafe_to(Vector2::new(10.0, 0.0)).unwrap();
        let idle = main.fork().wait(0.2).unwrap();
        let joined = main.join(vec![idle, drive]).unwrap();
        assert!((joined.end_pose().position.x - 10.0).abs() < EPSILON);
        assert_eq!(joined.build().len(), 1);
    }

    #[test]
    fn test_join_rejects_two_driving_branches() {
        let main = builder(Pose2::identity());
        let a = main.fork().strafe_to(Vector2::new(10.0, 0.0)).unwrap();
        let b = main.fork().turn(1.0).unwrap();
        assert!(matches!(main.join(vec![a, b]), Err(MotionError::InvalidParameter(_))));
    }

    #[test]
    fn test_join_rejects_round_trip_branch() {
        let main = builder(Pose2::identity());
        let out_and_back = main
            .fork()
            .strafe_to(Vector2::new(10.0, 0.0))
            .unwrap()
            .strafe_to(Vector2::new(0.0, 0.0))
            .unwrap();
        assert!(out_and_back.end_pose().position.x.abs() < EPSILON);
        let sideways = main.fork().strafe_to(Vector2::new(0.0, 10.0)).unwrap();
        assert!(matches!(main.join(vec![out_and_back, sideways]), Err(MotionError::InvalidParameter(_))));
    }

    #[test]
    fn test_nested_join_marks_branch_as_driving() {
        let main = builder(Pose2::identity());
        let inner = main.fork();
        let nested = inner.fork().strafe_to(Vector2::new(5.0, 0.0)).unwrap();
        let idle = inner.fork().wait(0.1).unwrap();
        let branch = inner.join(vec![nested, idle]).unwrap();
        let other = main.fork().turn(1.0).unwrap();
        assert!(matches!(main.join(vec![branch, other]), Err(MotionError::InvalidParameter(_))));
    }

    #[test]
    fn test_invalid_wait() {
        assert!(matches!(
            builder(Pose2::identity()).wait(f64::NAN),
            Err(MotionError::InvalidParameter(_))
        ));
    }
}
