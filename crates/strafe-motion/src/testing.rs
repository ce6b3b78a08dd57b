//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use strafe_kinematics::{DualNum, Twist2Dual, Vector2Dual, WheelState};

use crate::error::Result;
use crate::hardware::{DriveMotors, VoltageSource};
use crate::localizer::Localizer;
use crate::telemetry::{DriveSample, TelemetrySink};

/// Replays queued increments, then reports standing still.
#[derive(Default)]
pub(crate) struct ScriptedLocalizer {
    script: VecDeque<Result<Twist2Dual<2>>>,
}

impl ScriptedLocalizer {
    pub(crate) fn new(script: impl IntoIterator<Item = Result<Twist2Dual<2>>>) -> Self {
        ScriptedLocalizer { script: script.into_iter().collect() }
    }
}

impl Localizer for ScriptedLocalizer {
    fn update(&mut self) -> Result<Twist2Dual<2>> {
        self.script.pop_front().unwrap_or_else(|| Ok(Twist2Dual::zero()))
    }
}

/// Keeps every power command; clones share the log.
#[derive(Clone, Default)]
pub(crate) struct RecordingMotors {
    log: Arc<Mutex<Vec<WheelState<f64>>>>,
}

impl RecordingMotors {
    pub(crate) fn last(&self) -> Option<WheelState<f64>> {
        self.log.lock().last().copied()
    }

    pub(crate) fn count(&self) -> usize {
        self.log.lock().len()
    }
}

impl DriveMotors for RecordingMotors {
    fn set_powers(&mut self, powers: WheelState<f64>) -> Result<()> {
        self.log.lock().push(powers);
        Ok(())
    }
}

pub(crate) struct FixedVoltage(pub f64);

impl VoltageSource for FixedVoltage {
    fn voltage(&mut self) -> Result<f64> {
        Ok(self.0)
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    samples: Mutex<Vec<DriveSample>>,
}

impl RecordingSink {
    pub(crate) fn samples(&self) -> Vec<DriveSample> {
        self.samples.lock().clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&self, sample: DriveSample) {
        self.samples.lock().push(sample);
    }
}

/// Straight-ahead increment of `dx` inches while moving at `vx` in/s.
pub(crate) fn forward_twist(dx: f64, vx: f64) -> Twist2Dual<2> {
    Twist2Dual::new(
        Vector2Dual::new(DualNum::new([dx, vx]), DualNum::constant(0.0)),
        DualNum::constant(0.0),
    )
}
