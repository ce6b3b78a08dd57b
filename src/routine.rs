//! Autonomous routines assembled from a declarative step list.

use serde::Deserialize;
use strafe_kinematics::{Pose2, Vector2};
use strafe_motion::{ActionBuilder, BoxedAction, Result};

use crate::subsystems::{Claw, Lift};

/// Field pose in inches and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct FieldPose {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

impl From<FieldPose> for Pose2 {
    fn from(p: FieldPose) -> Self {
        Pose2::new(p.x, p.y, p.heading_deg.to_radians())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RoutineSettings {
    pub start: FieldPose,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    StrafeTo { x: f64, y: f64 },
    Turn { degrees: f64 },
    TurnTo { degrees: f64 },
    Wait { seconds: f64 },
    Claw { command: ClawCommand },
    Lift { command: LiftCommand },
    /// Each branch is its own step list; at most one branch may drive.
    Parallel { branches: Vec<Vec<Step>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClawCommand {
    CloseLeft,
    CloseRight,
    Close,
    OpenLeft,
    OpenRight,
    Open,
    PivotGround,
    PivotScoring,
    PivotWhiteGround,
    PivotWhiteScoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftCommand {
    ExtendScoring,
    ExtendStack,
    RetractScoring,
    RetractStack,
    Wait,
    Stop,
    Reset,
}

pub struct Mechanisms {
    pub claw: Claw,
    pub lift: Lift,
}

impl Mechanisms {
    fn claw(&self, command: ClawCommand) -> BoxedAction {
        let claw = &self.claw;
        match command {
            ClawCommand::CloseLeft => claw.close_left(),
            ClawCommand::CloseRight => claw.close_right(),
            ClawCommand::Close => claw.close(),
            ClawCommand::OpenLeft => claw.open_left(),
            ClawCommand::OpenRight => claw.open_right(),
            ClawCommand::Open => claw.open(),
            ClawCommand::PivotGround => claw.pivot_ground(),
            ClawCommand::PivotScoring => claw.pivot_scoring(),
            ClawCommand::PivotWhiteGround => claw.pivot_white_ground(),
            ClawCommand::PivotWhiteScoring => claw.pivot_white_scoring(),
        }
    }

    fn lift(&self, command: LiftCommand) -> BoxedAction {
        let lift = &self.lift;
        match command {
            LiftCommand::ExtendScoring => lift.extend_scoring(),
            LiftCommand::ExtendStack => lift.extend_stack(),
            LiftCommand::RetractScoring => lift.retract_scoring(),
            LiftCommand::RetractStack => lift.retract_stack(),
            LiftCommand::Wait => lift.wait(),
            LiftCommand::Stop => lift.stop(),
            LiftCommand::Reset => lift.reset(),
        }
    }
}

/// Append `steps` to `builder` in order.
pub fn build(builder: ActionBuilder, steps: &[Step], mechanisms: &Mechanisms) -> Result<ActionBuilder> {
    steps.iter().try_fold(builder, |builder, step| push(builder, step, mechanisms))
}

fn push(builder: ActionBuilder, step: &Step, mechanisms: &Mechanisms) -> Result<ActionBuilder> {
    match step {
        Step::StrafeTo { x, y } => builder.strafe_to(Vector2::new(*x, *y)),
        Step::Turn { degrees } => builder.turn(degrees.to_radians()),
        Step::TurnTo { degrees } => builder.turn_to(degrees.to_radians()),
        Step::Wait { seconds } => builder.wait(*seconds),
        Step::Claw { command } => Ok(builder.then(mechanisms.claw(*command))),
        Step::Lift { command } => Ok(builder.then(mechanisms.lift(*command))),
        Step::Parallel { branches } => {
            let forks = branches
                .iter()
                .map(|steps| build(builder.fork(), steps, mechanisms))
                .collect::<Result<Vec<_>>>()?;
            builder.join(forks)
        }
    }
}
