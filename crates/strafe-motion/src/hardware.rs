//! Contracts for the physical robot. The motion core never talks to devices
//! directly; it reads and writes through these traits, and any retry or
//! wraparound policy lives behind them.

use std::sync::Arc;

use parking_lot::Mutex;
use strafe_kinematics::WheelState;

use crate::error::Result;

/// A single drive-wheel encoder sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EncoderReading {
    /// Accumulated position (ticks). Must be monotonically interpretable.
    pub position: i32,
    /// Instantaneous velocity (ticks/s).
    pub velocity: f64,
}

impl EncoderReading {
    pub const fn new(position: i32, velocity: f64) -> Self {
        EncoderReading { position, velocity }
    }
}

/// Wheel encoders and the inertial heading.
pub trait SensorSource: Send {
    /// Current position and velocity of every drive wheel.
    fn wheel_encoders(&mut self) -> Result<WheelState<EncoderReading>>;

    /// Current heading (rad), counter-clockwise positive.
    fn heading(&mut self) -> Result<f64>;
}

/// The four drive motors.
pub trait DriveMotors: Send {
    /// Command a power in `[-1, 1]` on every wheel. The last command persists
    /// until overwritten.
    fn set_powers(&mut self, powers: WheelState<f64>) -> Result<()>;

    /// Zero every wheel.
    fn stop(&mut self) -> Result<()> {
        self.set_powers(WheelState::splat(0.0))
    }
}

/// Battery voltage.
pub trait VoltageSource: Send {
    /// Current supply voltage (V).
    fn voltage(&mut self) -> Result<f64>;
}

/// A positional servo such as a claw finger or pivot.
pub trait Servo: Send {
    /// Move to a normalized position in `[0, 1]`.
    fn set_position(&mut self, position: f64) -> Result<()>;
}

/// A motor running a closed position loop in its own controller, such as a
/// lift.
pub trait PositionMotor: Send {
    /// Stop the motor and zero its encoder.
    fn reset_encoder(&mut self) -> Result<()>;

    /// Drive to `target` ticks at up to `power`.
    fn run_to_position(&mut self, target: i32, power: f64) -> Result<()>;

    /// Set the output power directly, keeping the current mode.
    fn set_power(&mut self, power: f64) -> Result<()>;

    /// Whether the motor is still travelling toward its target.
    fn is_busy(&mut self) -> Result<bool>;
}

/// Hardware shared between several independently constructed actions.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap a device for sharing between actions.
pub fn shared<T>(device: T) -> Shared<T> {
    Arc::new(Mutex::new(device))
}
