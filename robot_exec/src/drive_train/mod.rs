//! Drive train module
//!
//! Two-sided arcade drive with a heading gyro and a fore-aft accelerometer.
//! Provides manual driving plus the tiered autonomous motions (heading,
//! distance and time based).

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

/// Possible errors that can occur while setting up the drive train.
#[derive(Debug, thiserror::Error)]
pub enum DriveTrainError {
    #[error("Failed to load DriveTrain parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
