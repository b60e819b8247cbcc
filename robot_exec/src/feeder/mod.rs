//! Feeder module
//!
//! A pneumatic piston pushing discs into the shooter, supplied by an on-board
//! compressor.

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
pub enum FeederError {
    #[error("Failed to load Feeder parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
