//! Time-indexed drive segments consumed by the follower.

use strafe_kinematics::{DualNum, Pose2, Pose2Dual, Vector2, Vector2Dual};

use crate::error::{MotionError, Result};

/// A precomputed segment: target pose as a function of elapsed time.
///
/// `get` returns the pose with its velocity and acceleration. Implementations
/// are immutable once built.
pub trait TimeTrajectory: Send {
    /// Total time to traverse the segment (s).
    fn duration(&self) -> f64;

    /// Target at elapsed time `t`, for `t` in `[0, duration]`.
    fn get(&self, t: f64) -> Pose2Dual<3>;

    /// Where the segment ends.
    fn end_pose(&self) -> Pose2 {
        self.get(self.duration()).value()
    }
}

/// Velocity and acceleration limits for a one-dimensional profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileLimits {
    pub max_vel: f64,
    pub max_accel: f64,
    /// Magnitude of the deceleration limit.
    pub max_decel: f64,
}

impl ProfileLimits {
    pub const fn new(max_vel: f64, max_accel: f64, max_decel: f64) -> Self {
        ProfileLimits { max_vel, max_accel, max_decel }
    }

    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidParameter)` unless every limit is
    /// positive and finite.
    pub fn validate(&self) -> Result<()> {
        for limit in [self.max_vel, self.max_accel, self.max_decel] {
            if !(limit > 0.0 && limit.is_finite()) {
                return Err(MotionError::InvalidParameter("profile limits must be positive and finite"));
            }
        }
        Ok(())
    }
}

/// Trapezoidal displacement profile with separate acceleration and
/// deceleration limits. Short moves that never reach cruise velocity
/// become triangular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeProfile {
    distance: f64,
    accel: f64,
    decel: f64,
    peak_vel: f64,
    accel_time: f64,
    cruise_time: f64,
    decel_time: f64,
}

impl TimeProfile {
    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidParameter)` for a negative or
    /// non-finite distance or for invalid limits.
    pub fn new(distance: f64, limits: ProfileLimits) -> Result<Self> {
        limits.validate()?;
        if !(distance >= 0.0 && distance.is_finite()) {
            return Err(MotionError::InvalidParameter("profile distance must be non-negative and finite"));
        }
        let ProfileLimits { max_vel, max_accel: accel, max_decel: decel } = limits;

        let ramp_distance = max_vel * max_vel / (2.0 * accel) + max_vel * max_vel / (2.0 * decel);
        let peak_vel = if distance >= ramp_distance {
            max_vel
        } else {
            (2.0 * distance * accel * decel / (accel + decel)).sqrt()
        };
        let accel_time = peak_vel / accel;
        let decel_time = peak_vel / decel;
        let cruise_time = if peak_vel > 0.0 {
            let ramps = peak_vel * peak_vel / (2.0 * accel) + peak_vel * peak_vel / (2.0 * decel);
            ((distance - ramps) / peak_vel).max(0.0)
        } else {
            0.0
        };

        Ok(TimeProfile { distance, accel, decel, peak_vel, accel_time, cruise_time, decel_time })
    }

    pub fn duration(&self) -> f64 {
        self.accel_time + self.cruise_time + self.decel_time
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Displacement, velocity and acceleration at `t`. Times outside the
    /// profile clamp to its ends.
    pub fn get(&self, t: f64) -> DualNum<3> {
        let t = t.max(0.0);
        let accel_distance = 0.5 * self.accel * self.accel_time * self.accel_time;
        let cruise_end = self.accel_time + self.cruise_time;

        if t < self.accel_time {
            DualNum::new([0.5 * self.accel * t * t, self.accel * t, self.accel])
        } else if t < cruise_end {
            let dt = t - self.accel_time;
            DualNum::new([accel_distance + self.peak_vel * dt, self.peak_vel, 0.0])
        } else if t < self.duration() {
            let dt = t - cruise_end;
            let start = accel_distance + self.peak_vel * self.cruise_time;
            DualNum::new([
                start + self.peak_vel * dt - 0.5 * self.decel * dt * dt,
                self.peak_vel - self.decel * dt,
                -self.decel,
            ])
        } else {
            DualNum::new([self.distance, 0.0, 0.0])
        }
    }
}

/// Straight-line translation at a fixed heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStrafe {
    begin: Pose2,
    direction: Vector2,
    profile: TimeProfile,
}

impl TimeStrafe {
    pub fn new(begin: Pose2, end: Vector2, limits: ProfileLimits) -> Result<Self> {
        let delta = end - begin.position;
        let distance = delta.norm();
        let direction = if distance > 0.0 { delta * (1.0 / distance) } else { Vector2::zero() };
        Ok(TimeStrafe { begin, direction, profile: TimeProfile::new(distance, limits)? })
    }
}

impl TimeTrajectory for TimeStrafe {
    fn duration(&self) -> f64 {
        self.profile.duration()
    }

    fn get(&self, t: f64) -> Pose2Dual<3> {
        let s = self.profile.get(t);
        Pose2Dual::new(
            Vector2Dual::new(
                s * self.direction.x + self.begin.position.x,
                s * self.direction.y + self.begin.position.y,
            ),
            DualNum::constant(self.begin.heading.log()),
        )
    }
}

/// In-place rotation by a signed angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTurn {
    begin: Pose2,
    angle: f64,
    profile: TimeProfile,
}

impl TimeTurn {
    /// `angle` is counter-clockwise positive and may exceed a half turn.
    pub fn new(begin: Pose2, angle: f64, limits: ProfileLimits) -> Result<Self> {
        Ok(TimeTurn { begin, angle, profile: TimeProfile::new(angle.abs(), limits)? })
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl TimeTrajectory for TimeTurn {
    fn duration(&self) -> f64 {
        self.profile.duration()
    }

    fn get(&self, t: f64) -> Pose2Dual<3> {
        let direction = if self.angle < 0.0 { -1.0 } else { 1.0 };
        Pose2Dual::new(
            Vector2Dual::constant(self.begin.position),
            self.profile.get(t) * direction + self.begin.heading.log(),
        )
    }
}
