//! Shooter module
//!
//! The shooter is a flywheel driven by one motor, mounted on a pitch axis
//! with an encoder. Pitch can be commanded by encoder position, by time, or
//! by angle using a linear calibration from degrees to encoder counts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ShooterError {
    #[error("Failed to load Shooter parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
