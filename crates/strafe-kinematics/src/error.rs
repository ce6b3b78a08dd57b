//! Errors raised while building kinematic models.

use core::fmt;

/// Errors raised when a kinematic model is built from invalid geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// The effective track width was zero, negative, or not finite.
    InvalidTrackWidth(&'static str),
    /// The lateral multiplier was zero, negative, or not finite.
    InvalidLateralMultiplier(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidTrackWidth(msg) => write!(f, "Invalid track width: {}", msg),
            KinematicsError::InvalidLateralMultiplier(msg) => {
                write!(f, "Invalid lateral multiplier: {}", msg)
            }
        }
    }
}

impl core::error::Error for KinematicsError {}
