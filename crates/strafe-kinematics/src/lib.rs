#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for mecanum-drive kinematics."]
#![doc = ""]
#![doc = "This crate provides dual numbers that carry time derivatives through arithmetic,"]
#![doc = "rigid 2D poses and body velocities built on them, and the forward and inverse"]
#![doc = "wheel maps of a four-wheel mecanum chassis."]

pub mod dual;
pub mod error;
pub mod geometry;
pub mod mecanum;

pub use dual::DualNum;
pub use error::KinematicsError;
pub use geometry::{
    Pose2, Pose2Dual, PoseVelocity2, PoseVelocity2Dual, Rotation2, Twist2, Twist2Dual, Vector2,
    Vector2Dual,
};
pub use mecanum::{MecanumKinematics, WheelState};
