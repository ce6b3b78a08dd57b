use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use strafe_kinematics::MecanumKinematics;

use crate::controller::ControllerGains;
use crate::error::{MotionError, Result};
use crate::feedforward::MotorFeedforward;
use crate::trajectory::ProfileLimits;

/// Calibrated drive constants.
///
/// Distances are measured in encoder ticks and converted to inches through
/// `in_per_tick`; the feedforward gains are tuned per tick and rescaled the
/// same way. Missing fields in a config file fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    // drive model
    pub in_per_tick: f64,
    pub lateral_in_per_tick: f64,
    pub track_width_ticks: f64,

    // feedforward (tick units)
    pub ks: f64,
    pub kv: f64,
    pub ka: f64,

    // path profile (in, s)
    pub max_wheel_vel: f64,
    pub min_profile_accel: f64,
    pub max_profile_accel: f64,

    // turn profile (rad, s)
    pub max_ang_vel: f64,
    pub max_ang_accel: f64,

    // path controller gains
    pub axial_gain: f64,
    pub lateral_gain: f64,
    pub heading_gain: f64,
    pub axial_vel_gain: f64,
    pub lateral_vel_gain: f64,
    pub heading_vel_gain: f64,
}

impl Default for DriveParams {
    fn default() -> Self {
        DriveParams {
            in_per_tick: 0.0029343584,
            lateral_in_per_tick: 0.002023526540982968,
            track_width_ticks: 5084.903040001737,

            ks: 1.1953050792827469,
            kv: 0.00022,
            ka: 0.0001775,

            max_wheel_vel: 60.0,
            min_profile_accel: -30.0,
            max_profile_accel: 60.0,

            max_ang_vel: PI,
            max_ang_accel: PI,

            axial_gain: 6.669,
            lateral_gain: 8.3,
            heading_gain: 6.5,
            axial_vel_gain: 0.0,
            lateral_vel_gain: 0.0,
            heading_vel_gain: 0.0,
        }
    }
}

impl DriveParams {
    /// Check the values that are used as divisors.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidParameter)` if a distance-per-tick
    /// constant is not positive and finite.
    pub fn validate(&self) -> Result<()> {
        for value in [self.in_per_tick, self.lateral_in_per_tick] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(MotionError::InvalidParameter("inches per tick must be positive and finite"));
            }
        }
        Ok(())
    }

    /// Wheel geometry in inches: track width `in_per_tick * track_width_ticks`
    /// and lateral multiplier `in_per_tick / lateral_in_per_tick`.
    pub fn kinematics(&self) -> Result<MecanumKinematics> {
        self.validate()?;
        Ok(MecanumKinematics::new(
            self.in_per_tick * self.track_width_ticks,
            self.in_per_tick / self.lateral_in_per_tick,
        )?)
    }

    /// Motor model rescaled from ticks to inches.
    pub fn feedforward(&self) -> MotorFeedforward {
        MotorFeedforward::new(self.ks, self.kv / self.in_per_tick, self.ka / self.in_per_tick)
    }

    pub fn gains(&self) -> ControllerGains {
        ControllerGains {
            axial: self.axial_gain,
            lateral: self.lateral_gain,
            heading: self.heading_gain,
            axial_vel: self.axial_vel_gain,
            lateral_vel: self.lateral_vel_gain,
            heading_vel: self.heading_vel_gain,
        }
    }

    /// Limits for straight-line segments. Deceleration is the magnitude of
    /// `min_profile_accel`.
    pub fn translation_limits(&self) -> ProfileLimits {
        ProfileLimits::new(self.max_wheel_vel, self.max_profile_accel, -self.min_profile_accel)
    }

    /// Limits for in-place turns.
    pub fn rotation_limits(&self) -> ProfileLimits {
        ProfileLimits::new(self.max_ang_vel, self.max_ang_accel, self.max_ang_accel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_derived_geometry() {
        let params = DriveParams::default();
        let kinematics = params.kinematics().unwrap();
        assert!((kinematics.track_width() - 0.0029343584 * 5084.903040001737).abs() < EPSILON);
        assert!((kinematics.lateral_multiplier() - 0.0029343584 / 0.002023526540982968).abs() < EPSILON);

        let ff = params.feedforward();
        // kV is tuned in volts per tick/s; one inch/s is 1 / in_per_tick ticks/s
        assert!((ff.compute_raw(1.0, 0.0) - (params.ks + params.kv / params.in_per_tick)).abs() < EPSILON);
    }

    #[test]
    fn test_translation_limits_use_decel_magnitude() {
        let limits = DriveParams::default().translation_limits();
        assert_eq!(limits.max_vel, 60.0);
        assert_eq!(limits.max_accel, 60.0);
        assert_eq!(limits.max_decel, 30.0);
    }

    #[test]
    fn test_invalid_in_per_tick() {
        let params = DriveParams { in_per_tick: 0.0, ..DriveParams::default() };
        assert!(matches!(params.kinematics(), Err(MotionError::InvalidParameter(_))));
    }
}
