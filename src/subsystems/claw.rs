use serde::Deserialize;
use strafe_motion::{Action, BoxedAction, InstantAction, Result, Servo, Shared, shared};

/// Servo positions for the claw fingers and pivot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClawPresets {
    pub closed_left: f64,
    pub closed_right: f64,
    pub open_left: f64,
    pub open_right: f64,
    pub pivot_ground: f64,
    pub pivot_scoring: f64,
    // white pixel stack
    pub pivot_white_ground: f64,
    pub pivot_white_scoring: f64,
}

impl Default for ClawPresets {
    fn default() -> Self {
        ClawPresets {
            closed_left: 0.33,
            closed_right: 0.37,
            open_left: 0.45,
            open_right: 0.25,
            pivot_ground: 0.815,
            pivot_scoring: 0.25,
            pivot_white_ground: 0.85,
            pivot_white_scoring: 0.75,
        }
    }
}

pub struct ClawServos {
    pub left: Box<dyn Servo>,
    pub right: Box<dyn Servo>,
    pub pivot: Box<dyn Servo>,
}

#[derive(Debug, Clone, Copy)]
enum Joint {
    Left,
    Right,
    Pivot,
}

/// Two fingers on a pivoting wrist.
#[derive(Clone)]
pub struct Claw {
    servos: Shared<ClawServos>,
    presets: ClawPresets,
}

impl Claw {
    pub fn new(servos: ClawServos, presets: ClawPresets) -> Self {
        Claw { servos: shared(servos), presets }
    }

    pub fn close_left(&self) -> BoxedAction {
        self.set(&[(Joint::Left, self.presets.closed_left)])
    }

    pub fn close_right(&self) -> BoxedAction {
        self.set(&[(Joint::Right, self.presets.closed_right)])
    }

    pub fn close(&self) -> BoxedAction {
        self.set(&[(Joint::Left, self.presets.closed_left), (Joint::Right, self.presets.closed_right)])
    }

    pub fn open_left(&self) -> BoxedAction {
        self.set(&[(Joint::Left, self.presets.open_left)])
    }

    pub fn open_right(&self) -> BoxedAction {
        self.set(&[(Joint::Right, self.presets.open_right)])
    }

    pub fn open(&self) -> BoxedAction {
        self.set(&[(Joint::Left, self.presets.open_left), (Joint::Right, self.presets.open_right)])
    }

    pub fn pivot_ground(&self) -> BoxedAction {
        self.set(&[(Joint::Pivot, self.presets.pivot_ground)])
    }

    pub fn pivot_scoring(&self) -> BoxedAction {
        self.set(&[(Joint::Pivot, self.presets.pivot_scoring)])
    }

    pub fn pivot_white_ground(&self) -> BoxedAction {
        self.set(&[(Joint::Pivot, self.presets.pivot_white_ground)])
    }

    pub fn pivot_white_scoring(&self) -> BoxedAction {
        self.set(&[(Joint::Pivot, self.presets.pivot_white_scoring)])
    }

    fn set(&self, moves: &[(Joint, f64)]) -> BoxedAction {
        let servos = self.servos.clone();
        let moves = moves.to_vec();
        InstantAction::new(move || -> Result<()> {
            let mut servos = servos.lock();
            for &(joint, position) in &moves {
                let servo = match joint {
                    Joint::Left => &mut servos.left,
                    Joint::Right => &mut servos.right,
                    Joint::Pivot => &mut servos.pivot,
                };
                servo.set_position(position)?;
            }
            Ok(())
        })
        .boxed()
    }
}
