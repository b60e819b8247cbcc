//! # Equipment interface crate.
//!
//! Provides the boundary between the control software and the robot's
//! hardware. Control modules only ever see the traits defined here, never a
//! concrete driver.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator and sensor traits
pub mod eqpt;

/// Camera interface and frame type
pub mod cam;

/// Operator controller state
pub mod input;

/// Construction of equipment from configured channels
pub mod builder;

/// In-memory equipment for running without hardware
pub mod sim;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use builder::EqptBuilder;
