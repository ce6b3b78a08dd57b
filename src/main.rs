mod bus;
mod routine;
mod runner;
mod settings;
mod sim;
mod subsystems;

use std::sync::Arc;

use anyhow::Context;
use bus::Topic;
use routine::Mechanisms;
use settings::Settings;
use sim::{SimLift, SimRobot, SimServo};
use strafe_kinematics::Pose2;
use strafe_motion::{ActionBuilder, DriveSample, MecanumDrive, MecanumLocalizer};
use subsystems::{Claw, ClawServos, Lift};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| settings::DEFAULT_CONFIG_PATH.to_string());
    let settings = settings::load_settings(&path).with_context(|| format!("loading {path}"))?;

    info!("Strafe runner started.");
    let telemetry: Topic<DriveSample> = Topic::new(settings.runner.telemetry_capacity);
    let logger = bus::spawn_logger(telemetry.subscribe())?;

    let result = run(&settings, telemetry);
    // The logger exits once every sender, including the drive's, is dropped.
    if logger.join().is_err() {
        tracing::error!("telemetry logger panicked");
    }
    result
}

fn run(settings: &Settings, telemetry: Topic<DriveSample>) -> anyhow::Result<()> {
    let start: Pose2 = settings.routine.start.into();
    settings.drive.validate().context("invalid drive parameters")?;

    let robot = SimRobot::new(&settings.drive, &settings.sim, start)?;
    let localizer = MecanumLocalizer::from_params(robot.clone(), &settings.drive)?;
    let drive = MecanumDrive::new(&settings.drive, localizer, robot.clone(), robot.clone(), start)?
        .with_telemetry(Arc::new(telemetry))
        .into_shared();

    let mechanisms = Mechanisms {
        claw: Claw::new(
            ClawServos {
                left: Box::new(SimServo::new("claw_left")),
                right: Box::new(SimServo::new("claw_right")),
                pivot: Box::new(SimServo::new("claw_pivot")),
            },
            settings.claw.clone(),
        ),
        lift: Lift::new(SimLift::new(&settings.sim), settings.lift.clone()),
    };

    let builder = ActionBuilder::from_params(drive.clone(), start, &settings.drive);
    let builder = routine::build(builder, &settings.routine.steps, &mechanisms).context("building routine")?;
    let planned = builder.end_pose();
    let mut action = builder.build();

    runner::run_blocking(&mut action, &drive, &settings.runner)?;

    let estimate = drive.lock().pose();
    info!(%planned, %estimate, truth = %robot.pose(), "Routine complete.");
    Ok(())
}
