use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use strafe_motion::DriveParams;
use tracing::{error, info};

use crate::routine::RoutineSettings;
use crate::runner::RunnerSettings;
use crate::sim::SimSettings;
use crate::subsystems::{ClawPresets, LiftPresets};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub drive: DriveParams,
    pub claw: ClawPresets,
    pub lift: LiftPresets,
    pub runner: RunnerSettings,
    pub sim: SimSettings,
    pub routine: RoutineSettings,
}

/// Load settings from a TOML file, overridden by `STRAFE__SECTION__KEY`
/// environment variables.
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("STRAFE").separator("__").try_parsing(true))
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!(steps = settings.routine.steps.len(), "Successfully loaded configuration");
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
