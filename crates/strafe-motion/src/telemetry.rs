//! Diagnostic samples emitted while driving.

use strafe_kinematics::{Pose2, PoseVelocity2Dual, WheelState};

/// One diagnostic sample from the drive loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveSample {
    /// Pose estimate after integrating the latest localizer increment.
    EstimatedPose(Pose2),
    /// Trajectory target for the current tick.
    TargetPose(Pose2),
    /// Controller output: body velocity with acceleration.
    DriveCommand(PoseVelocity2Dual<2>),
    /// Wheel powers actually written, and the voltage they were scaled by.
    MecanumCommand { voltage: f64, powers: WheelState<f64> },
    /// Target relative to the estimate, robot frame (in, in, deg).
    TrackingError { x: f64, y: f64, heading_deg: f64 },
}

/// Receives drive samples for display or logging.
///
/// Publishing must not block and has no failure mode visible to the drive;
/// a sink that cannot keep up drops samples.
pub trait TelemetrySink: Send + Sync {
    fn publish(&self, sample: DriveSample);
}
