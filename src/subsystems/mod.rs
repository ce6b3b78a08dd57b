//! Mechanism subsystems. Each command is a leaf action that issues its
//! hardware write on the first tick and completes immediately, except the
//! lift wait which polls until the motor settles.

pub mod claw;
pub mod lift;

pub use claw::{Claw, ClawPresets, ClawServos};
pub use lift::{Lift, LiftPresets};
