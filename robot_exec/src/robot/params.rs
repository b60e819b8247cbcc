//! Parameters structure for the Robot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the orchestration of the subsystems.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Directory holding the autonomous scripts, relative to the software
    /// root.
    pub script_dir: String,

    // ---- SHOOTING ----

    /// Power used by the AutoShoot button.
    ///
    /// Units: percent
    pub auto_shoot_power: i32,

    /// Units: seconds
    pub auto_shooter_spinup_time_s: f64,

    /// Time the piston is held out for each disc.
    ///
    /// Units: seconds
    pub auto_shooter_spindown_time_s: f64,

    pub rapid_fire_discs: u32,

    /// Units: percent
    pub rapid_fire_power: i32,

    // ---- AIMING ----

    pub aim_turn_speed: f64,

    pub aim_pitch_speed: f64,

    // ---- PITCH PRESETS ----

    /// Units: degrees
    pub auto_feeder_height_angle_deg: f64,

    /// Units: degrees
    pub auto_climbing_angle_deg: f64,

    pub preset_pitch_speed: f64,

    // ---- CLIMBING ----

    /// Backwards drive speed held for the whole climb.
    pub climb_creep_speed: f64,

    /// Units: seconds
    pub climb_head_start_time_s: f64,

    pub climb_head_start_winch_speed: f64,

    /// Units: degrees
    pub climb_pitch_angle_deg: f64,

    pub climb_pitch_speed: f64,

    /// Units: seconds
    pub climb_winch_time_s: f64,

    pub climb_winch_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            script_dir: String::from("scripts"),
            auto_shoot_power: 100,
            auto_shooter_spinup_time_s: 1.5,
            auto_shooter_spindown_time_s: 0.5,
            rapid_fire_discs: 3,
            rapid_fire_power: 100,
            aim_turn_speed: 1.0,
            aim_pitch_speed: 1.0,
            auto_feeder_height_angle_deg: 50.0,
            auto_climbing_angle_deg: 20.0,
            preset_pitch_speed: 1.0,
            climb_creep_speed: 0.2,
            climb_head_start_time_s: 1.0,
            climb_head_start_winch_speed: 1.0,
            climb_pitch_angle_deg: 0.0,
            climb_pitch_speed: 1.0,
            climb_winch_time_s: 3.0,
            climb_winch_speed: 1.0,
        }
    }
}
