//! Motor model feedforward and power normalization.

use strafe_kinematics::{DualNum, WheelState};

use crate::error::{MotionError, Result};

/// Voltage needed to hold a wheel velocity and acceleration:
/// `ks * sign(v) + kv * v + ka * a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorFeedforward {
    ks: f64,
    kv: f64,
    ka: f64,
}

impl MotorFeedforward {
    /// # Arguments
    ///
    /// * `ks`: Static friction voltage (V).
    /// * `kv`: Velocity gain (V per in/s).
    /// * `ka`: Acceleration gain (V per in/s²).
    pub const fn new(ks: f64, kv: f64, ka: f64) -> Self {
        MotorFeedforward { ks, kv, ka }
    }

    /// Voltage for a wheel velocity carried with its acceleration.
    pub fn compute(&self, vel: DualNum<2>) -> f64 {
        self.compute_raw(vel.value(), vel.get(1))
    }

    pub fn compute_raw(&self, vel: f64, accel: f64) -> f64 {
        self.ks * sign(vel) + self.kv * vel + self.ka * accel
    }
}

/// Like `f64::signum` but zero at zero, so a wheel commanded to rest gets no
/// static friction kick.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Clamp to the actuator range.
pub fn clamp_power(power: f64) -> f64 {
    power.clamp(-1.0, 1.0)
}

/// Reject a voltage reading that cannot be used as a divisor.
///
/// # Errors
///
/// Returns `Err(MotionError::DegenerateVoltage)` for zero, negative, or
/// non-finite readings.
pub fn check_voltage(voltage: f64) -> Result<f64> {
    if voltage > 0.0 && voltage.is_finite() {
        Ok(voltage)
    } else {
        Err(MotionError::DegenerateVoltage(voltage))
    }
}

/// Per-wheel power from commanded wheel velocities, compensated for the
/// measured supply voltage and clamped.
pub fn wheel_powers(
    feedforward: &MotorFeedforward,
    wheel_vels: WheelState<DualNum<2>>,
    voltage: f64,
) -> Result<WheelState<f64>> {
    let voltage = check_voltage(voltage)?;
    Ok(wheel_vels.map(|vel| clamp_power(feedforward.compute(vel) / voltage)))
}

/// Scale raw powers down so the largest magnitude is at most one.
///
/// The divisor never drops below 1.0, so commands already inside the range
/// pass through unchanged.
pub fn normalize_powers(powers: WheelState<f64>) -> WheelState<f64> {
    let max_magnitude = powers.all().iter().fold(1.0_f64, |max, p| max.max(p.abs()));
    powers.map(|p| clamp_power(p / max_magnitude))
}
