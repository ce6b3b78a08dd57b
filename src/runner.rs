use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Deserialize;
use spin_sleep::SpinSleeper;
use strafe_motion::{Action, SharedDrive};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Loop period (ms). Zero runs ticks back to back.
    pub period_ms: u64,
    /// Spin-sleep accuracy (ns).
    pub sleep_accuracy_ns: u32,
    /// Telemetry topic capacity.
    pub telemetry_capacity: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        RunnerSettings { period_ms: 10, sleep_accuracy_ns: 100_000, telemetry_capacity: 64 }
    }
}

/// Tick `action` until it reports done.
///
/// If a tick fails the drive is halted before the error is returned.
/// Returns the number of ticks run.
pub fn run_blocking(action: &mut dyn Action, drive: &SharedDrive, settings: &RunnerSettings) -> anyhow::Result<u64> {
    let period = Duration::from_millis(settings.period_ms);
    let sleeper = SpinSleeper::new(settings.sleep_accuracy_ns);
    let started = Instant::now();
    let mut ticks = 0u64;

    info!(period_ms = settings.period_ms, "Runner started.");
    loop {
        let now = Instant::now();
        ticks += 1;
        match action.tick(now) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                drive.lock().halt(&e);
                return Err(e).with_context(|| format!("action failed on tick {ticks}"));
            }
        }
        if let Some(rest) = period.checked_sub(now.elapsed()) {
            sleeper.sleep(rest);
        }
    }
    info!(ticks, elapsed = ?started.elapsed(), "Runner finished.");
    Ok(ticks)
}
