//! Drives whole routines against an ideal plant: wheels reach exactly the
//! speed the feedforward model asks for, and encoders and heading are exact.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use parking_lot::Mutex;
use strafe_kinematics::{DualNum, MecanumKinematics, Pose2, Vector2, WheelState};
use strafe_motion::{
    Action, ActionBuilder, DriveMotors, DriveParams, EncoderReading, MecanumDrive, MecanumLocalizer, Result,
    SensorSource, VoltageSource,
};

const DT: f64 = 0.01;
const VOLTAGE: f64 = 12.0;

struct Plant {
    kinematics: MecanumKinematics,
    in_per_tick: f64,
    kv: f64,
    pose: Pose2,
    ticks: WheelState<f64>,
    powers: WheelState<f64>,
}

impl Plant {
    fn wheel_velocities(&self) -> WheelState<f64> {
        self.powers.map(|p| p * VOLTAGE / self.kv)
    }

    /// Run the last command for one period.
    fn advance(&mut self) {
        let vels = self.wheel_velocities();
        let in_per_tick = self.in_per_tick;
        self.ticks = self.ticks.zip(vels).map(|(t, v)| t + v * DT / in_per_tick);
        let twist = self.kinematics.forward(vels.map(|v| DualNum::<1>::constant(v * DT)));
        self.pose = self.pose.plus(twist.value());
    }
}

#[derive(Clone)]
struct PlantHandle(Arc<Mutex<Plant>>);

impl SensorSource for PlantHandle {
    fn wheel_encoders(&mut self) -> Result<WheelState<EncoderReading>> {
        let mut plant = self.0.lock();
        plant.advance();
        let in_per_tick = plant.in_per_tick;
        let readings = plant
            .ticks
            .zip(plant.wheel_velocities())
            .map(|(t, v)| EncoderReading::new(t.round() as i32, v / in_per_tick));
        Ok(readings)
    }

    fn heading(&mut self) -> Result<f64> {
        Ok(self.0.lock().pose.heading.log())
    }
}

impl DriveMotors for PlantHandle {
    fn set_powers(&mut self, powers: WheelState<f64>) -> Result<()> {
        self.0.lock().powers = powers;
        Ok(())
    }
}

impl VoltageSource for PlantHandle {
    fn voltage(&mut self) -> Result<f64> {
        Ok(VOLTAGE)
    }
}

fn ideal_params() -> DriveParams {
    DriveParams { ks: 0.0, ka: 0.0, ..DriveParams::default() }
}

fn plant(params: &DriveParams) -> PlantHandle {
    PlantHandle(Arc::new(Mutex::new(Plant {
        kinematics: params.kinematics().unwrap(),
        in_per_tick: params.in_per_tick,
        kv: params.kv / params.in_per_tick,
        pose: Pose2::identity(),
        ticks: WheelState::splat(0.0),
        powers: WheelState::splat(0.0),
    })))
}

/// Tick until the action reports done, one plant period per tick.
fn run(action: &mut impl Action) -> usize {
    let t0 = Instant::now();
    for tick in 0..2000 {
        let now = t0 + Duration::from_secs_f64(tick as f64 * DT);
        if !action.tick(now).unwrap() {
            return tick + 1;
        }
    }
    panic!("routine did not finish");
}

#[test]
fn test_strafe_reaches_target() {
    let params = ideal_params();
    let hw = plant(&params);
    let localizer = MecanumLocalizer::from_params(hw.clone(), &params).unwrap();
    let drive = MecanumDrive::new(&params, localizer, hw.clone(), hw.clone(), Pose2::identity())
        .unwrap()
        .into_shared();

    let mut routine = ActionBuilder::from_params(drive.clone(), Pose2::identity(), &params)
        .strafe_to(Vector2::new(24.0, 12.0))
        .unwrap()
        .build();
    let ticks = run(&mut routine);
    assert!(ticks > 100);

    let estimate = drive.lock().pose();
    assert_abs_diff_eq!(estimate.position.x, 24.0, epsilon = 0.5);
    assert_abs_diff_eq!(estimate.position.y, 12.0, epsilon = 0.5);
    assert_abs_diff_eq!(estimate.heading.log(), 0.0, epsilon = 0.02);

    // The estimate tracks the plant
    let truth = hw.0.lock().pose;
    assert_abs_diff_eq!(truth.position.x, estimate.position.x, epsilon = 0.1);
    assert_abs_diff_eq!(truth.position.y, estimate.position.y, epsilon = 0.1);

    assert_eq!(hw.0.lock().powers, WheelState::splat(0.0));
}

#[test]
fn test_square_corner_with_turn() {
    let params = ideal_params();
    let hw = plant(&params);
    let localizer = MecanumLocalizer::from_params(hw.clone(), &params).unwrap();
    let drive = MecanumDrive::new(&params, localizer, hw.clone(), hw.clone(), Pose2::identity())
        .unwrap()
        .into_shared();

    let mut routine = ActionBuilder::from_params(drive.clone(), Pose2::identity(), &params)
        .strafe_to(Vector2::new(20.0, 0.0))
        .unwrap()
        .turn(FRAC_PI_2)
        .unwrap()
        .wait(0.1)
        .unwrap()
        .strafe_to(Vector2::new(20.0, 20.0))
        .unwrap()
        .build();
    run(&mut routine);

    let estimate = drive.lock().pose();
    assert_abs_diff_eq!(estimate.position.x, 20.0, epsilon = 0.5);
    assert_abs_diff_eq!(estimate.position.y, 20.0, epsilon = 0.5);
    assert_abs_diff_eq!(estimate.heading.log(), FRAC_PI_2, epsilon = 0.02);
    assert_eq!(hw.0.lock().powers, WheelState::splat(0.0));
}
