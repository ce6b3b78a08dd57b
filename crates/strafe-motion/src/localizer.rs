//! Incremental pose estimation from drive encoders and an inertial heading.

use strafe_kinematics::{DualNum, MecanumKinematics, Rotation2, Twist2Dual, WheelState};
use tracing::debug;

use crate::error::Result;
use crate::hardware::SensorSource;
use crate::params::DriveParams;

/// Produces the body-frame increment since the previous call.
pub trait Localizer: Send {
    /// Increment (in, rad) since the last call, carrying the body velocity
    /// as its first derivative. The first call returns the zero increment.
    fn update(&mut self) -> Result<Twist2Dual<2>>;
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    positions: WheelState<i32>,
    heading: Rotation2,
}

/// Four-wheel encoder odometry with the heading delta taken from the IMU.
///
/// Encoder track-width heading drifts with wheel slip, so the angular
/// displacement of each increment is replaced by the IMU delta while the
/// encoder-derived angular rate is kept as the derivative.
pub struct MecanumLocalizer<S> {
    sensors: S,
    kinematics: MecanumKinematics,
    in_per_tick: f64,
    baseline: Option<Baseline>,
}

impl<S: SensorSource> MecanumLocalizer<S> {
    pub fn new(sensors: S, kinematics: MecanumKinematics, in_per_tick: f64) -> Self {
        MecanumLocalizer { sensors, kinematics, in_per_tick, baseline: None }
    }

    pub fn from_params(sensors: S, params: &DriveParams) -> Result<Self> {
        Ok(MecanumLocalizer::new(sensors, params.kinematics()?, params.in_per_tick))
    }

    /// Whether a baseline has been captured.
    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }
}

impl<S: SensorSource> Localizer for MecanumLocalizer<S> {
    fn update(&mut self) -> Result<Twist2Dual<2>> {
        let encoders = self.sensors.wheel_encoders()?;
        let heading = Rotation2::exp(self.sensors.heading()?);

        let current = Baseline { positions: encoders.map(|e| e.position), heading };
        let Some(last) = self.baseline.replace(current) else {
            debug!(heading = %heading, "localizer baseline captured");
            return Ok(Twist2Dual::zero());
        };

        let heading_delta = heading.minus(last.heading);
        let in_per_tick = self.in_per_tick;
        let increments = encoders.zip(last.positions).map(|(now, before)| {
            let delta = i64::from(now.position) - i64::from(before);
            DualNum::new([delta as f64, now.velocity]) * in_per_tick
        });

        let twist = self.kinematics.forward(increments);
        Ok(Twist2Dual::new(twist.line, twist.angle.with_value(heading_delta)))
    }
}
