//! Parameters structure for the Shooter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::axis::AxisParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the shooter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Flywheel motor channel, zero or less if not fitted.
    pub shooter_motor_channel: i32,

    /// Pitch motor, encoder and automatic motion parameters.
    pub pitch: AxisParams,

    pub pitch_normal_speed_ratio: f64,

    pub pitch_turbo_speed_ratio: f64,

    pub shooter_normal_speed_ratio: f64,

    /// Flywheel demand for the smallest non-zero power.
    pub shooter_min_power_speed: f64,

    /// Flywheel demand added per percent of power.
    pub shooter_power_adjustment_ratio: f64,

    /// Gradient of the angle to encoder count fit.
    ///
    /// Units: counts/degree
    pub angle_linear_fit_gradient: f64,

    /// Units: counts
    pub angle_linear_fit_constant: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            shooter_motor_channel: -1,
            pitch: AxisParams::default(),
            pitch_normal_speed_ratio: 1.0,
            pitch_turbo_speed_ratio: 1.0,
            shooter_normal_speed_ratio: 1.0,
            shooter_min_power_speed: 0.4,
            shooter_power_adjustment_ratio: 0.006,
            angle_linear_fit_gradient: 1.0,
            angle_linear_fit_constant: 0.0,
        }
    }
}
