//! Forward and inverse kinematics for a four-wheel mecanum chassis.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dual::DualNum;
use crate::error::KinematicsError;
use crate::geometry::{PoseVelocity2Dual, Twist2Dual, Vector2Dual};

/// One value per drive wheel.
///
/// Used for encoder increments on the sensing side and for velocity or power
/// commands on the actuation side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelState<T> {
    /// Front-left wheel.
    pub left_front: T,
    /// Back-left wheel.
    pub left_back: T,
    /// Back-right wheel.
    pub right_back: T,
    /// Front-right wheel.
    pub right_front: T,
}

impl<T> WheelState<T> {
    /// Construct from the four wheel values.
    pub const fn new(left_front: T, left_back: T, right_back: T, right_front: T) -> Self {
        WheelState { left_front, left_back, right_back, right_front }
    }

    /// Apply `f` to every wheel.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> WheelState<U> {
        WheelState {
            left_front: f(self.left_front),
            left_back: f(self.left_back),
            right_back: f(self.right_back),
            right_front: f(self.right_front),
        }
    }

    /// Pair each wheel with the same wheel of `other`.
    pub fn zip<U>(self, other: WheelState<U>) -> WheelState<(T, U)> {
        WheelState {
            left_front: (self.left_front, other.left_front),
            left_back: (self.left_back, other.left_back),
            right_back: (self.right_back, other.right_back),
            right_front: (self.right_front, other.right_front),
        }
    }

    /// All four values in `[left_front, left_back, right_back, right_front]`
    /// order.
    pub fn all(self) -> [T; 4] {
        [self.left_front, self.left_back, self.right_back, self.right_front]
    }
}

impl<T: Copy> WheelState<T> {
    /// The same value on every wheel.
    pub const fn splat(value: T) -> Self {
        WheelState { left_front: value, left_back: value, right_back: value, right_front: value }
    }
}

impl<T: fmt::Display> fmt::Display for WheelState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(lf: {}, lb: {}, rb: {}, rf: {})",
            self.left_front, self.left_back, self.right_back, self.right_front
        )
    }
}

/// Mecanum-drive kinematics helper.
///
/// Holds the two geometry constants that fully determine the linear map
/// between wheel motion and chassis motion: the effective track width (the
/// lever arm between a wheel's rolling direction and the chassis center) and
/// the lateral multiplier (how much less a wheel travels when the chassis
/// strafes, relative to driving forward).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MecanumKinematics {
    /// Effective track width (in).
    track_width: f64,
    /// Lateral-to-forward scale.
    lateral_multiplier: f64,
}

impl MecanumKinematics {
    /// Construct a new mecanum kinematics helper.
    ///
    /// # Arguments
    ///
    /// * `track_width`: Effective track width in inches.
    /// * `lateral_multiplier`: Ratio of lateral to forward wheel travel.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidTrackWidth)` if `track_width` is not positive and finite.
    /// Returns `Err(KinematicsError::InvalidLateralMultiplier)` if `lateral_multiplier` is not positive and finite.
    pub fn new(track_width: f64, lateral_multiplier: f64) -> Result<Self, KinematicsError> {
        if !(track_width > 0.0 && track_width.is_finite()) {
            return Err(KinematicsError::InvalidTrackWidth("must be positive and finite"));
        }
        if !(lateral_multiplier > 0.0 && lateral_multiplier.is_finite()) {
            return Err(KinematicsError::InvalidLateralMultiplier("must be positive and finite"));
        }
        Ok(MecanumKinematics { track_width, lateral_multiplier })
    }

    /// Unit geometry: track width 1 and no lateral scaling. Used to turn a
    /// raw body velocity request into relative wheel powers.
    pub const fn unit() -> Self {
        MecanumKinematics { track_width: 1.0, lateral_multiplier: 1.0 }
    }

    /// Returns the effective track width.
    pub fn track_width(&self) -> f64 {
        self.track_width
    }

    /// Returns the lateral multiplier.
    pub fn lateral_multiplier(&self) -> f64 {
        self.lateral_multiplier
    }

    /// Chassis increment from wheel increments. This is the forward
    /// kinematics problem.
    ///
    /// # Arguments
    ///
    /// * `wheels`: Distance travelled by each wheel (in), with derivatives.
    ///
    /// # Returns
    ///
    /// The body-frame increment with the same derivatives.
    pub fn forward<const N: usize>(&self, wheels: WheelState<DualNum<N>>) -> Twist2Dual<N> {
        let WheelState { left_front: lf, left_back: lb, right_back: rb, right_front: rf } = wheels;
        Twist2Dual::new(
            Vector2Dual::new(
                (lf + lb + rb + rf) * 0.25,
                (-lf + lb - rb + rf) * (0.25 / self.lateral_multiplier),
            ),
            (-lf - lb + rb + rf) * (0.25 / self.track_width),
        )
    }

    /// Wheel velocities that realize a body velocity. This is the inverse
    /// kinematics problem.
    ///
    /// # Arguments
    ///
    /// * `velocity`: Body-frame velocity, with derivatives.
    ///
    /// # Returns
    ///
    /// The velocity of each wheel (in/s) with the same derivatives.
    pub fn inverse<const N: usize>(&self, velocity: PoseVelocity2Dual<N>) -> WheelState<DualNum<N>> {
        let vx = velocity.linear_vel.x;
        let vy = velocity.linear_vel.y * self.lateral_multiplier;
        let w = velocity.ang_vel * self.track_width;
        WheelState::new(vx - vy - w, vx + vy - w, vx - vy + w, vx + vy + w)
    }
}

impl fmt::Display for MecanumKinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MecanumKinematics (track width: {:.2} in, lateral multiplier: {:.3})",
            self.track_width, self.lateral_multiplier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PoseVelocity2, Vector2};
    const EPSILON: f64 = 1e-9;

    fn constant_wheels(w: WheelState<f64>) -> WheelState<DualNum<2>> {
        w.map(DualNum::constant)
    }

    #[test]
    fn test_kinematics_constructor() {
        let kinematics = MecanumKinematics::new(14.9, 1.45).unwrap();
        assert_eq!(kinematics.track_width(), 14.9);
        assert_eq!(kinematics.lateral_multiplier(), 1.45);
        assert_eq!(MecanumKinematics::unit(), MecanumKinematics::new(1.0, 1.0).unwrap());
    }

    #[test]
    fn test_constructor_invalid_geometry() {
        assert!(matches!(
            MecanumKinematics::new(0.0, 1.0),
            Err(KinematicsError::InvalidTrackWidth("must be positive and finite"))
        ));
        assert!(matches!(
            MecanumKinematics::new(f64::NAN, 1.0),
            Err(KinematicsError::InvalidTrackWidth(_))
        ));
        assert!(matches!(
            MecanumKinematics::new(10.0, -1.0),
            Err(KinematicsError::InvalidLateralMultiplier("must be positive and finite"))
        ));
    }

    #[test]
    fn test_forward_equal_increments_drive_straight() {
        // Each wheel travels 1000 ticks * 0.003 in/tick = 3 in
        let kinematics = MecanumKinematics::new(15.0, 1.0).unwrap();
        let twist = kinematics.forward(constant_wheels(WheelState::splat(1000.0 * 0.003)));
        assert!((twist.line.x.value() - 3.0).abs() < EPSILON);
        assert!(twist.line.y.value().abs() < EPSILON);
        assert!(twist.angle.value().abs() < EPSILON);
    }

    #[test]
    fn test_forward_strafe_and_spin() {
        let kinematics = MecanumKinematics::new(2.0, 1.0).unwrap();
        // Strafing left: lf and rb run backwards, lb and rf forwards
        let strafe = kinematics.forward(constant_wheels(WheelState::new(-1.0, 1.0, -1.0, 1.0)));
        assert!(strafe.line.x.value().abs() < EPSILON);
        assert!((strafe.line.y.value() - 1.0).abs() < EPSILON);
        // Spinning counter-clockwise: left side back, right side forward
        // angle = (1 + 1 + 1 + 1) * 0.25 / 2 = 0.5
        let spin = kinematics.forward(constant_wheels(WheelState::new(-1.0, -1.0, 1.0, 1.0)));
        assert!(spin.line.x.value().abs() < EPSILON);
        assert!((spin.angle.value() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_forward_carries_derivative() {
        let kinematics = MecanumKinematics::new(2.0, 1.0).unwrap();
        let wheels = WheelState::splat(DualNum::new([0.0, 12.0]));
        let twist = kinematics.forward(wheels);
        assert!(twist.line.x.value().abs() < EPSILON);
        assert!((twist.line.x.get(1) - 12.0).abs() < EPSILON);
    }

    #[test]
    fn test_inverse_unit_forward_velocity() {
        let kinematics = MecanumKinematics::unit();
        let one = kinematics.inverse(PoseVelocity2Dual::<1>::constant(PoseVelocity2::new(Vector2::new(1.0, 0.0), 0.0)));
        for w in one.all() {
            assert!((w.value() - 1.0).abs() < EPSILON);
        }
        let two = kinematics.inverse(PoseVelocity2Dual::<1>::constant(PoseVelocity2::new(Vector2::new(2.0, 0.0), 0.0)));
        for (a, b) in one.all().into_iter().zip(two.all()) {
            assert!((b.value() - 2.0 * a.value()).abs() < EPSILON);
        }
    }

    #[test]
    fn test_forward_inverse_round_trip() {
        let kinematics = MecanumKinematics::new(7.3, 1.37).unwrap();
        let cases = [
            PoseVelocity2::new(Vector2::new(12.0, -4.0), 0.0),
            PoseVelocity2::new(Vector2::new(0.0, 0.0), 1.7),
            PoseVelocity2::new(Vector2::new(-3.0, 8.0), -0.4),
        ];
        for case in cases {
            let wheels = kinematics.inverse(PoseVelocity2Dual::<2>::constant(case));
            let twist = kinematics.forward(wheels);
            assert!((twist.line.x.value() - case.linear_vel.x).abs() < EPSILON);
            assert!((twist.line.y.value() - case.linear_vel.y).abs() < EPSILON);
            assert!((twist.angle.value() - case.ang_vel).abs() < EPSILON);

            // And the wheel side is recovered from the chassis side
            let again = kinematics.inverse(PoseVelocity2Dual::new(twist.line, twist.angle));
            for (a, b) in wheels.all().into_iter().zip(again.all()) {
                assert!((a.value() - b.value()).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_wheel_state_helpers() {
        let w = WheelState::new(1, 2, 3, 4);
        assert_eq!(w.all(), [1, 2, 3, 4]);
        assert_eq!(w.map(|v| v * 10).all(), [10, 20, 30, 40]);
        assert_eq!(w.zip(WheelState::splat('a')).left_back, (2, 'a'));
    }
}
