//! Climber module
//!
//! A winch axis with separate manual up and down speed ratios.

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
pub enum ClimberError {
    #[error("Failed to load Climber parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
