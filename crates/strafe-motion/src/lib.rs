#![doc = "Motion core for a mecanum robot."]
#![doc = ""]
#![doc = "Encoder and IMU odometry, a proportional holonomic trajectory follower with"]
#![doc = "motor feedforward, and a cooperative action scheduler that composes drive"]
#![doc = "segments with mechanism commands. Hardware is reached only through the"]
#![doc = "collaborator traits in [`hardware`]."]

pub mod action;
pub mod builder;
pub mod controller;
pub mod drive;
pub mod error;
pub mod feedforward;
pub mod follow;
pub mod hardware;
pub mod localizer;
pub mod params;
pub mod telemetry;
pub mod trajectory;

#[cfg(test)]
mod testing;

pub use action::{Action, BoxedAction, FnAction, InstantAction, Parallel, Sequential, Sleep};
pub use builder::ActionBuilder;
pub use controller::{ControllerGains, HolonomicController};
pub use drive::{MecanumDrive, POSE_HISTORY_CAPACITY, SharedDrive};
pub use error::{MotionError, Result};
pub use feedforward::MotorFeedforward;
pub use follow::{FollowState, FollowTrajectoryAction, TurnAction};
pub use hardware::{
    DriveMotors, EncoderReading, PositionMotor, SensorSource, Servo, Shared, VoltageSource, shared,
};
pub use localizer::{Localizer, MecanumLocalizer};
pub use params::DriveParams;
pub use telemetry::{DriveSample, TelemetrySink};
pub use trajectory::{ProfileLimits, TimeProfile, TimeStrafe, TimeTrajectory, TimeTurn};
