use strafe_kinematics::KinematicsError;

/// Errors surfaced by the motion core.
///
/// The kinematics, controller and feedforward math are total functions and
/// never fail; everything here originates at a hardware boundary, in a
/// configuration value, or in the action lifecycle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    /// A required sensor reading could not be obtained.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// An actuator rejected a command.
    #[error("actuator fault: {0}")]
    ActuatorFault(String),

    /// The supply voltage reading was zero, negative, or not finite.
    #[error("degenerate supply voltage reading: {0} V")]
    DegenerateVoltage(f64),

    /// An action was ticked outside its lifecycle.
    #[error("action misuse: {0}")]
    ActionMisuse(&'static str),

    /// A tuning or profile parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The drive geometry is invalid.
    #[error("invalid drive geometry: {0}")]
    Kinematics(#[from] KinematicsError),
}

pub type Result<T, E = MotionError> = std::result::Result<T, E>;
