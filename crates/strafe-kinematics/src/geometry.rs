//! Rigid 2D geometry: vectors, rotations, poses, twists and body velocities,
//! each with a dual-number counterpart that carries time derivatives.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use libm::{atan2, cos, hypot, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dual::DualNum;

/// A 2D vector in inches (positions, displacements) or inches per second
/// (linear velocities).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
}

impl Vector2 {
    /// Construct a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Vector2 { x: 0.0, y: 0.0 }
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        hypot(self.x, self.y)
    }

    /// Dot product.
    pub fn dot(&self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A 2D vector whose components carry time derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2Dual<const N: usize> {
    /// x component.
    pub x: DualNum<N>,
    /// y component.
    pub y: DualNum<N>,
}

impl<const N: usize> Vector2Dual<N> {
    /// Construct from dual components.
    pub const fn new(x: DualNum<N>, y: DualNum<N>) -> Self {
        Vector2Dual { x, y }
    }

    /// A vector that does not change over time.
    pub fn constant(v: Vector2) -> Self {
        Vector2Dual::new(DualNum::constant(v.x), DualNum::constant(v.y))
    }

    /// The value channel.
    pub fn value(&self) -> Vector2 {
        Vector2::new(self.x.value(), self.y.value())
    }

    /// The first derivative and above, one order shorter.
    pub fn drop_first<const M: usize>(&self) -> Vector2Dual<M> {
        Vector2Dual::new(self.x.drop_first(), self.y.drop_first())
    }
}

impl<const N: usize> Add for Vector2Dual<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector2Dual::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<const N: usize> Sub for Vector2Dual<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vector2Dual::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A planar rotation stored as a unit complex number `(cos θ, sin θ)`.
///
/// The constructor and every composition renormalize, so the pair always
/// describes a valid rotation even after long chains of updates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation2 {
    real: f64,
    imag: f64,
}

impl Rotation2 {
    /// The identity rotation.
    pub const fn identity() -> Self {
        Rotation2 { real: 1.0, imag: 0.0 }
    }

    /// The rotation by `angle` radians counter-clockwise.
    pub fn exp(angle: f64) -> Self {
        Rotation2 { real: cos(angle), imag: sin(angle) }
    }

    /// Build from an unnormalized `(cos, sin)` pair. A zero pair yields the
    /// identity.
    pub fn from_parts(real: f64, imag: f64) -> Self {
        let norm = hypot(real, imag);
        if norm == 0.0 || !norm.is_finite() {
            return Rotation2::identity();
        }
        Rotation2 { real: real / norm, imag: imag / norm }
    }

    /// Cosine of the rotation angle.
    pub fn real(&self) -> f64 {
        self.real
    }

    /// Sine of the rotation angle.
    pub fn imag(&self) -> f64 {
        self.imag
    }

    /// The rotation angle in `(-PI, PI]`.
    pub fn log(&self) -> f64 {
        atan2(self.imag, self.real)
    }

    /// The opposite rotation.
    pub fn inverse(&self) -> Self {
        Rotation2 { real: self.real, imag: -self.imag }
    }

    /// Shortest signed angle that takes `other` onto `self`, in `(-PI, PI]`.
    ///
    /// Wraps correctly across the ±PI seam: 179° minus -179° is -2°.
    pub fn minus(&self, other: Rotation2) -> f64 {
        (*self * other.inverse()).log()
    }
}

impl Default for Rotation2 {
    fn default() -> Self {
        Rotation2::identity()
    }
}

impl Mul for Rotation2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Rotation2::from_parts(
            self.real * rhs.real - self.imag * rhs.imag,
            self.real * rhs.imag + self.imag * rhs.real,
        )
    }
}

impl Mul<Vector2> for Rotation2 {
    type Output = Vector2;

    fn mul(self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.real * v.x - self.imag * v.y,
            self.imag * v.x + self.real * v.y,
        )
    }
}

impl fmt::Display for Rotation2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} rad", self.log())
    }
}

/// A rigid 2D pose: position in the world frame plus heading.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2 {
    /// World-frame position (in).
    pub position: Vector2,
    /// Heading, counter-clockwise from the world x-axis.
    pub heading: Rotation2,
}

impl Pose2 {
    /// Construct a pose from coordinates and a heading angle.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in inches.
    /// * `y`: World-frame y position in inches.
    /// * `heading`: Heading in radians.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose2 { position: Vector2::new(x, y), heading: Rotation2::exp(heading) }
    }

    /// Construct a pose from its parts.
    pub const fn from_parts(position: Vector2, heading: Rotation2) -> Self {
        Pose2 { position, heading }
    }

    /// The identity pose: origin, zero heading.
    pub const fn identity() -> Self {
        Pose2 { position: Vector2::zero(), heading: Rotation2::identity() }
    }

    /// The inverse transform, so that `p * p.inverse()` is the identity.
    pub fn inverse(&self) -> Self {
        let heading = self.heading.inverse();
        Pose2 { position: -(heading * self.position), heading }
    }

    /// Advance this pose by a body-frame increment.
    ///
    /// The increment's linear part is rotated into the world frame by the
    /// current heading and added to the position; the angular part is
    /// composed onto the heading, which is renormalized.
    pub fn plus(&self, twist: Twist2) -> Self {
        Pose2 {
            position: self.position + self.heading * twist.line,
            heading: self.heading * Rotation2::exp(twist.angle),
        }
    }

    /// The rigid transform taking `other` onto `self`, expressed in the frame
    /// of `other`: `other⁻¹ · self`.
    ///
    /// Unlike a coordinate difference, the heading component is the shortest
    /// signed angle, so `p.minus(p)` is exactly the identity.
    pub fn minus(&self, other: Pose2) -> Self {
        other.inverse() * *self
    }
}

/// Rigid composition: `self` followed by `rhs` expressed in `self`'s frame.
impl Mul for Pose2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Pose2 {
            position: self.position + self.heading * rhs.position,
            heading: self.heading * rhs.heading,
        }
    }
}

impl fmt::Display for Pose2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.2}, y: {:.2}, θ: {:.2} rad)",
            self.position.x,
            self.position.y,
            self.heading.log()
        )
    }
}

/// A pose whose position and heading angle carry time derivatives.
///
/// The heading is held as an unwrapped angle so its derivatives stay
/// continuous through ±PI.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2Dual<const N: usize> {
    /// World-frame position.
    pub position: Vector2Dual<N>,
    /// Heading angle (rad), not wrapped.
    pub heading: DualNum<N>,
}

impl<const N: usize> Pose2Dual<N> {
    /// Construct from dual parts.
    pub const fn new(position: Vector2Dual<N>, heading: DualNum<N>) -> Self {
        Pose2Dual { position, heading }
    }

    /// A pose that does not change over time.
    pub fn constant(pose: Pose2) -> Self {
        Pose2Dual::new(Vector2Dual::constant(pose.position), DualNum::constant(pose.heading.log()))
    }

    /// The value channel as a plain pose.
    pub fn value(&self) -> Pose2 {
        Pose2::from_parts(self.position.value(), Rotation2::exp(self.heading.value()))
    }

    /// World-frame velocity, with the remaining derivatives.
    pub fn velocity<const M: usize>(&self) -> PoseVelocity2Dual<M> {
        PoseVelocity2Dual::new(self.position.drop_first(), self.heading.drop_first())
    }
}

/// A body-frame pose increment: the displacement accumulated over one tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist2 {
    /// Linear displacement (in), robot frame.
    pub line: Vector2,
    /// Heading change (rad).
    pub angle: f64,
}

impl Twist2 {
    /// Construct a twist.
    pub const fn new(line: Vector2, angle: f64) -> Self {
        Twist2 { line, angle }
    }
}

impl fmt::Display for Twist2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(dx: {:.3}, dy: {:.3}, dθ: {:.3} rad)", self.line.x, self.line.y, self.angle)
    }
}

/// A body-frame increment whose components carry time derivatives.
///
/// The value channel is the displacement over one tick; the first
/// derivative is the body velocity at the end of that tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist2Dual<const N: usize> {
    /// Linear displacement, robot frame.
    pub line: Vector2Dual<N>,
    /// Heading change.
    pub angle: DualNum<N>,
}

impl<const N: usize> Twist2Dual<N> {
    /// Construct from dual parts.
    pub const fn new(line: Vector2Dual<N>, angle: DualNum<N>) -> Self {
        Twist2Dual { line, angle }
    }

    /// The zero increment: no motion and no velocity.
    pub fn zero() -> Self {
        Twist2Dual::default()
    }

    /// The displacement channel.
    pub fn value(&self) -> Twist2 {
        Twist2::new(self.line.value(), self.angle.value())
    }

    /// The body velocity, with the remaining derivatives.
    pub fn velocity<const M: usize>(&self) -> PoseVelocity2Dual<M> {
        PoseVelocity2Dual::new(self.line.drop_first(), self.angle.drop_first())
    }
}

/// A velocity expressed in the robot's body frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseVelocity2 {
    /// Linear velocity (in/s): x forward, y left.
    pub linear_vel: Vector2,
    /// Angular velocity (rad/s), counter-clockwise positive.
    pub ang_vel: f64,
}

impl PoseVelocity2 {
    /// Construct a body velocity.
    pub const fn new(linear_vel: Vector2, ang_vel: f64) -> Self {
        PoseVelocity2 { linear_vel, ang_vel }
    }

    /// Standing still.
    pub const fn zero() -> Self {
        PoseVelocity2 { linear_vel: Vector2::zero(), ang_vel: 0.0 }
    }
}

impl Add for PoseVelocity2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        PoseVelocity2::new(self.linear_vel + rhs.linear_vel, self.ang_vel + rhs.ang_vel)
    }
}

impl Sub for PoseVelocity2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        PoseVelocity2::new(self.linear_vel - rhs.linear_vel, self.ang_vel - rhs.ang_vel)
    }
}

impl fmt::Display for PoseVelocity2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(vx: {:.2} in/s, vy: {:.2} in/s, ω: {:.2} rad/s)",
            self.linear_vel.x, self.linear_vel.y, self.ang_vel
        )
    }
}

/// A velocity whose components carry further time derivatives
/// (acceleration and up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseVelocity2Dual<const N: usize> {
    /// Linear velocity.
    pub linear_vel: Vector2Dual<N>,
    /// Angular velocity.
    pub ang_vel: DualNum<N>,
}

impl<const N: usize> PoseVelocity2Dual<N> {
    /// Construct from dual parts.
    pub const fn new(linear_vel: Vector2Dual<N>, ang_vel: DualNum<N>) -> Self {
        PoseVelocity2Dual { linear_vel, ang_vel }
    }

    /// A velocity that does not change over time.
    pub fn constant(v: PoseVelocity2) -> Self {
        PoseVelocity2Dual::new(Vector2Dual::constant(v.linear_vel), DualNum::constant(v.ang_vel))
    }

    /// The value channel.
    pub fn value(&self) -> PoseVelocity2 {
        PoseVelocity2::new(self.linear_vel.value(), self.ang_vel.value())
    }

    /// Rotate the linear part by a fixed rotation; angular velocity is
    /// unchanged.
    pub fn rotated(&self, rotation: Rotation2) -> Self {
        let (c, s) = (rotation.real(), rotation.imag());
        PoseVelocity2Dual::new(
            Vector2Dual::new(
                self.linear_vel.x * c - self.linear_vel.y * s,
                self.linear_vel.x * s + self.linear_vel.y * c,
            ),
            self.ang_vel,
        )
    }
}

/// Adding a plain velocity corrects the value channel and leaves the
/// derivatives alone.
impl<const N: usize> Add<PoseVelocity2> for PoseVelocity2Dual<N> {
    type Output = Self;

    fn add(self, rhs: PoseVelocity2) -> Self {
        PoseVelocity2Dual::new(
            Vector2Dual::new(self.linear_vel.x + rhs.linear_vel.x, self.linear_vel.y + rhs.linear_vel.y),
            self.ang_vel + rhs.ang_vel,
        )
    }
}
