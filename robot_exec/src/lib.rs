//! # Robot library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the robot crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Shared command types - robot modes, directions and subsystem identifiers
pub mod cmd;

/// Tiered motion primitive - converts a motion request into a demand and a completion flag
pub mod motion;

/// Single motor axis with optional encoder, shared by the pitch and the winch
pub mod axis;

/// Drive train - arcade drive, heading and distance motions
pub mod drive_train;

/// Shooter - flywheel and pitch axis
pub mod shooter;

/// Climber - winch axis
pub mod climber;

/// Feeder - pneumatic piston and compressor
pub mod feeder;

/// Targeting - background vision worker and the latest target snapshot
pub mod targeting;

/// Robot - mode handling, autonomous scripts, operator control and routines
pub mod robot;

/// Global data store for the executable
pub mod data_store;
