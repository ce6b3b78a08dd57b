//! In-memory robot standing in for the hub hardware.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Deserialize;
use strafe_kinematics::{DualNum, MecanumKinematics, Pose2, WheelState};
use strafe_motion::{
    DriveMotors, DriveParams, EncoderReading, MotionError, PositionMotor, Result, SensorSource, Servo,
    VoltageSource,
};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Battery voltage reported to the drive (V).
    pub voltage: f64,
    /// Lift speed at full power (ticks/s).
    pub lift_speed: f64,
    /// Lift position tolerance (ticks).
    pub lift_tolerance: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings { voltage: 12.5, lift_speed: 2000.0, lift_tolerance: 5.0 }
    }
}

struct Plant {
    kinematics: MecanumKinematics,
    in_per_tick: f64,
    ks: f64,
    kv: f64,
    voltage: f64,
    pose: Pose2,
    ticks: WheelState<f64>,
    powers: WheelState<f64>,
    last: Option<Instant>,
}

impl Plant {
    /// Steady-state wheel speed (in/s) for a power: the motor model solved
    /// for velocity with no acceleration term.
    fn wheel_speed(&self, power: f64) -> f64 {
        let drive = power * self.voltage;
        if drive.abs() <= self.ks {
            0.0
        } else {
            (drive - self.ks * drive.signum()) / self.kv
        }
    }

    fn wheel_speeds(&self) -> WheelState<f64> {
        self.powers.map(|p| self.wheel_speed(p))
    }

    fn advance(&mut self, now: Instant) {
        let dt = match self.last.replace(now) {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        let speeds = self.wheel_speeds();
        let in_per_tick = self.in_per_tick;
        self.ticks = self.ticks.zip(speeds).map(|(t, v)| t + v * dt / in_per_tick);
        let twist = self.kinematics.forward(speeds.map(|v| DualNum::<1>::constant(v * dt)));
        self.pose = self.pose.plus(twist.value());
    }
}

/// Drivetrain plant. Wheels reach the speed the motor model predicts for
/// their power at once; encoders and heading integrate on every read.
#[derive(Clone)]
pub struct SimRobot {
    plant: Arc<Mutex<Plant>>,
}

impl SimRobot {
    pub fn new(params: &DriveParams, settings: &SimSettings, start: Pose2) -> Result<Self> {
        let plant = Plant {
            kinematics: params.kinematics()?,
            in_per_tick: params.in_per_tick,
            ks: params.ks,
            kv: params.kv / params.in_per_tick,
            voltage: settings.voltage,
            pose: start,
            ticks: WheelState::splat(0.0),
            powers: WheelState::splat(0.0),
            last: None,
        };
        Ok(SimRobot { plant: Arc::new(Mutex::new(plant)) })
    }

    /// Ground-truth pose of the simulated chassis.
    pub fn pose(&self) -> Pose2 {
        self.plant.lock().pose
    }
}

impl SensorSource for SimRobot {
    fn wheel_encoders(&mut self) -> Result<WheelState<EncoderReading>> {
        let mut plant = self.plant.lock();
        plant.advance(Instant::now());
        let in_per_tick = plant.in_per_tick;
        Ok(plant
            .ticks
            .zip(plant.wheel_speeds())
            .map(|(t, v)| EncoderReading::new(t.round() as i32, v / in_per_tick)))
    }

    fn heading(&mut self) -> Result<f64> {
        Ok(self.plant.lock().pose.heading.log())
    }
}

impl DriveMotors for SimRobot {
    fn set_powers(&mut self, powers: WheelState<f64>) -> Result<()> {
        if powers.all().iter().any(|p| !p.is_finite()) {
            return Err(MotionError::ActuatorFault(format!("non-finite wheel power {powers}")));
        }
        let mut plant = self.plant.lock();
        // Integrate the previous command up to now before switching.
        plant.advance(Instant::now());
        plant.powers = powers;
        Ok(())
    }
}

impl VoltageSource for SimRobot {
    fn voltage(&mut self) -> Result<f64> {
        Ok(self.plant.lock().voltage)
    }
}

#[derive(Debug)]
pub struct SimServo {
    name: &'static str,
    position: Option<f64>,
}

impl SimServo {
    pub fn new(name: &'static str) -> Self {
        SimServo { name, position: None }
    }

    pub fn position(&self) -> Option<f64> {
        self.position
    }
}

impl Servo for SimServo {
    fn set_position(&mut self, position: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&position) {
            return Err(MotionError::ActuatorFault(format!("{} position {position} out of range", self.name)));
        }
        debug!(servo = self.name, position, "servo moved");
        self.position = Some(position);
        Ok(())
    }
}

/// Run-to-position motor that travels at `lift_speed * power`.
#[derive(Debug)]
pub struct SimLift {
    speed: f64,
    tolerance: f64,
    position: f64,
    target: f64,
    power: f64,
    last: Instant,
}

impl SimLift {
    pub fn new(settings: &SimSettings) -> Self {
        SimLift {
            speed: settings.lift_speed,
            tolerance: settings.lift_tolerance,
            position: 0.0,
            target: 0.0,
            power: 0.0,
            last: Instant::now(),
        }
    }

    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        let step = self.speed * self.power * dt;
        let remaining = self.target - self.position;
        self.position += remaining.clamp(-step, step);
    }
}

impl PositionMotor for SimLift {
    fn reset_encoder(&mut self) -> Result<()> {
        self.position = 0.0;
        self.target = 0.0;
        self.power = 0.0;
        self.last = Instant::now();
        Ok(())
    }

    fn run_to_position(&mut self, target: i32, power: f64) -> Result<()> {
        self.advance(Instant::now());
        self.target = f64::from(target);
        self.power = power.abs().min(1.0);
        debug!(target, power = self.power, "lift running to position");
        Ok(())
    }

    fn set_power(&mut self, power: f64) -> Result<()> {
        self.advance(Instant::now());
        self.power = power.abs().min(1.0);
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool> {
        self.advance(Instant::now());
        let busy = self.power > 0.0 && (self.target - self.position).abs() > self.tolerance;
        trace!(position = self.position, target = self.target, busy, "lift polled");
        Ok(busy)
    }
}
