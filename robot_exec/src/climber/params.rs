//! Parameters structure for the Climber

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::axis::AxisParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Winch motor, encoder and automatic motion parameters.
    pub winch: AxisParams,

    pub normal_up_speed_ratio: f64,

    pub normal_down_speed_ratio: f64,

    pub turbo_up_speed_ratio: f64,

    pub turbo_down_speed_ratio: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            winch: AxisParams::default(),
            normal_up_speed_ratio: 1.0,
            normal_down_speed_ratio: 1.0,
            turbo_up_speed_ratio: 1.0,
            turbo_down_speed_ratio: 1.0,
        }
    }
}
