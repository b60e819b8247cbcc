//! Parameters structure for DriveTrain

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::motion::Tiers;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive train.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- CHANNELS ----

    /// Left side motor controller channel, zero or less if not fitted.
    pub left_motor_channel: i32,

    /// Right side motor controller channel, zero or less if not fitted.
    pub right_motor_channel: i32,

    pub gyro_channel: i32,

    pub accelerometer_channel: i32,

    // ---- DIRECTIONS ----

    /// Linear demand sign which moves the chassis forwards.
    pub forward_direction: f64,

    pub backward_direction: f64,

    /// Turn demand sign which turns the chassis left (anticlockwise).
    pub left_direction: f64,

    pub right_direction: f64,

    // ---- MANUAL DRIVING ----

    pub normal_linear_speed_ratio: f64,

    pub turbo_linear_speed_ratio: f64,

    pub normal_turning_speed_ratio: f64,

    pub turbo_turning_speed_ratio: f64,

    /// Maximum change in linear demand between two cycles, zero or less to
    /// disable limiting.
    pub max_linear_speed_change: f64,

    /// Maximum change in turn demand between two cycles, zero or less to
    /// disable limiting.
    pub max_turn_speed_change: f64,

    // ---- AUTONOMOUS MOTIONS ----

    /// Units: distance units of the integrated accelerometer
    pub distance_threshold: f64,

    /// Units: degrees
    pub heading_threshold_deg: f64,

    /// Units: seconds
    pub time_threshold_s: f64,

    /// Breakpoints on remaining distance, with linear speed ratios.
    pub distance_tiers: Tiers,

    /// Breakpoints on remaining heading error (degrees), with turning speed
    /// ratios.
    pub heading_tiers: Tiers,

    /// Breakpoints on remaining time (seconds), with linear speed ratios.
    pub linear_time_tiers: Tiers,

    /// Breakpoints on remaining time (seconds), with turning speed ratios.
    pub turning_time_tiers: Tiers,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            left_motor_channel: -1,
            right_motor_channel: -1,
            gyro_channel: -1,
            accelerometer_channel: -1,
            forward_direction: 1.0,
            backward_direction: -1.0,
            left_direction: -1.0,
            right_direction: 1.0,
            normal_linear_speed_ratio: 1.0,
            turbo_linear_speed_ratio: 1.0,
            normal_turning_speed_ratio: 1.0,
            turbo_turning_speed_ratio: 1.0,
            max_linear_speed_change: 0.0,
            max_turn_speed_change: 0.0,
            distance_threshold: 0.5,
            heading_threshold_deg: 3.0,
            time_threshold_s: 0.1,
            distance_tiers: Tiers {
                medium_breakpoint: 2.0,
                far_breakpoint: 5.0,
                ..Tiers::default()
            },
            heading_tiers: Tiers {
                medium_breakpoint: 15.0,
                far_breakpoint: 25.0,
                ..Tiers::default()
            },
            linear_time_tiers: Tiers {
                medium_breakpoint: 0.5,
                far_breakpoint: 1.0,
                ..Tiers::default()
            },
            turning_time_tiers: Tiers {
                medium_breakpoint: 0.5,
                far_breakpoint: 1.0,
                ..Tiers::default()
            },
        }
    }
}
