use serde::Deserialize;
use strafe_motion::{Action, BoxedAction, FnAction, InstantAction, PositionMotor, Result, Shared, shared};
use tracing::debug;

/// A relative run-to-position move, taken from a freshly zeroed encoder.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LiftMove {
    pub target: i32,
    pub power: f64,
}

impl LiftMove {
    pub const fn new(target: i32, power: f64) -> Self {
        LiftMove { target, power }
    }
}

/// Lift travel presets. Negative targets raise the lift.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LiftPresets {
    pub extend_scoring: LiftMove,
    pub extend_stack: LiftMove,
    pub retract_scoring: LiftMove,
    pub retract_stack: LiftMove,
}

impl Default for LiftPresets {
    fn default() -> Self {
        LiftPresets {
            extend_scoring: LiftMove::new(-600, 0.7),
            extend_stack: LiftMove::new(-375, 0.5),
            retract_scoring: LiftMove::new(600, 0.7),
            retract_stack: LiftMove::new(375, 0.6),
        }
    }
}

#[derive(Clone)]
pub struct Lift {
    motor: Shared<Box<dyn PositionMotor>>,
    presets: LiftPresets,
}

impl Lift {
    pub fn new(motor: impl PositionMotor + 'static, presets: LiftPresets) -> Self {
        let motor: Box<dyn PositionMotor> = Box::new(motor);
        Lift { motor: shared(motor), presets }
    }

    pub fn extend_scoring(&self) -> BoxedAction {
        self.run(self.presets.extend_scoring)
    }

    pub fn extend_stack(&self) -> BoxedAction {
        self.run(self.presets.extend_stack)
    }

    pub fn retract_scoring(&self) -> BoxedAction {
        self.run(self.presets.retract_scoring)
    }

    pub fn retract_stack(&self) -> BoxedAction {
        self.run(self.presets.retract_stack)
    }

    /// Needs more ticks while the motor is still travelling.
    pub fn wait(&self) -> BoxedAction {
        let motor = self.motor.clone();
        FnAction::new(move |_| motor.lock().is_busy()).boxed()
    }

    pub fn stop(&self) -> BoxedAction {
        let motor = self.motor.clone();
        InstantAction::new(move || motor.lock().set_power(0.0)).boxed()
    }

    pub fn reset(&self) -> BoxedAction {
        let motor = self.motor.clone();
        InstantAction::new(move || motor.lock().reset_encoder()).boxed()
    }

    fn run(&self, mv: LiftMove) -> BoxedAction {
        let motor = self.motor.clone();
        InstantAction::new(move || -> Result<()> {
            let mut motor = motor.lock();
            motor.reset_encoder()?;
            debug!(target = mv.target, power = mv.power, "lift move");
            motor.run_to_position(mv.target, mv.power)
        })
        .boxed()
    }
}
