//! Proportional pose and velocity tracking for a holonomic base.

use strafe_kinematics::{Pose2, Pose2Dual, PoseVelocity2, PoseVelocity2Dual, Vector2};

/// Gains for the three tracked channels. Position gains have units of 1/s,
/// velocity gains are dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerGains {
    pub axial: f64,
    pub lateral: f64,
    pub heading: f64,
    pub axial_vel: f64,
    pub lateral_vel: f64,
    pub heading_vel: f64,
}

/// Feedforward plus proportional feedback on pose and body velocity.
///
/// There is no integral term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolonomicController {
    gains: ControllerGains,
}

impl HolonomicController {
    pub const fn new(gains: ControllerGains) -> Self {
        HolonomicController { gains }
    }

    pub fn gains(&self) -> &ControllerGains {
        &self.gains
    }

    /// Body velocity command for one tick.
    ///
    /// # Arguments
    ///
    /// * `target`: Target pose with velocity and acceleration.
    /// * `actual`: Current pose estimate.
    /// * `actual_vel`: Current body-frame velocity estimate.
    ///
    /// # Returns
    ///
    /// The target velocity expressed in the target's frame, with its
    /// acceleration untouched, plus the feedback correction on the value
    /// channel.
    pub fn compute(&self, target: Pose2Dual<3>, actual: Pose2, actual_vel: PoseVelocity2) -> PoseVelocity2Dual<2> {
        let target_pose = target.value();
        let target_vel: PoseVelocity2Dual<2> = target.velocity();
        let target_vel_robot = target_vel.rotated(target_pose.heading.inverse());

        let vel_error = target_vel_robot.value() - actual_vel;
        let error = target_pose.minus(actual);

        let g = &self.gains;
        target_vel_robot
            + PoseVelocity2::new(
                Vector2::new(
                    g.axial * error.position.x + g.axial_vel * vel_error.linear_vel.x,
                    g.lateral * error.position.y + g.lateral_vel * vel_error.linear_vel.y,
                ),
                g.heading * error.heading.log() + g.heading_vel * vel_error.ang_vel,
            )
    }
}
