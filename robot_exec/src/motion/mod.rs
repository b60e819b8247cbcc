//! # Tiered motion primitive
//!
//! Every subsystem that drives towards a setpoint (chassis heading and
//! distance, shooter pitch, climber winch) uses the calculators in this
//! module. A calculator is stateless: it is handed the current reading and
//! the request every control cycle and returns the motor demand plus a flag
//! saying whether the setpoint has been reached.
//!
//! The demand magnitude is `speed * ratio`, where the ratio is picked from a
//! far, medium or near tier depending on how much error (or time) remains.
//! There is no integral or derivative action, and no stall detection: a
//! position motion whose sensor never converges keeps demanding motion until
//! it is cancelled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod position;
mod tiers;
mod timed;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use position::*;
pub use tiers::*;
pub use timed::*;

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of one evaluation of a motion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionOutput {
    /// Signed normalised motor demand.
    pub demand: f64,

    /// True once the setpoint has been reached (or the motion aborted), in
    /// which case `demand` is zero.
    pub reached: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionOutput {
    /// Stop and report complete.
    pub fn complete() -> Self {
        Self {
            demand: 0.0,
            reached: true,
        }
    }

    /// Keep moving with the given demand.
    pub fn moving(demand: f64) -> Self {
        Self {
            demand,
            reached: false,
        }
    }
}
