//! Parameters structure for Targeting

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the targeting pipeline and the target geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Camera address, empty if no camera is fitted.
    pub camera_address: String,

    /// Horizontal field of view of the camera.
    ///
    /// Units: degrees
    pub camera_view_angle_deg: f64,

    /// Time after start-up before the camera is first accessed.
    ///
    /// Units: seconds
    pub camera_boot_time_s: f64,

    /// Period between checks for a fresh image.
    ///
    /// Units: seconds
    pub poll_period_s: f64,

    /// Save the first processed frame into the session directory.
    pub save_sample_image: bool,

    // ---- SEGMENTATION ----

    pub threshold_type: ThresholdType,

    pub plane_1: ChannelBounds,

    pub plane_2: ChannelBounds,

    pub plane_3: ChannelBounds,

    /// Number of erosions a blob must survive to be kept.
    pub small_object_erosions: u32,

    // ---- FILTERING ----

    pub rectangle_ratio_min: f64,

    pub rectangle_ratio_max: f64,

    /// Detections must score strictly more than this to be kept.
    ///
    /// Units: percent
    pub rectangle_score_threshold: f64,

    // ---- GEOMETRY ----

    /// Physical width of a target.
    ///
    /// Units: feet
    pub target_width: f64,

    /// Maximum difference between a detection's aspect ratio and a profile's
    /// ratio for the profile to match.
    pub rectangle_ratio_threshold: f64,

    pub high_profile: HeightProfile,

    pub medium_profile: HeightProfile,

    pub low_profile: HeightProfile,

    /// Units: degrees
    pub horizontal_angle_offset_deg: f64,

    /// Units: degrees
    pub vertical_angle_offset_deg: f64,

    /// Added to the estimated distance before computing the vertical angle.
    ///
    /// Units: feet
    pub distance_offset: f64,
}

/// Inclusive bounds on one colour plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ChannelBounds {
    pub low: u8,
    pub high: u8,
}

/// A calibrated target: its aspect ratio and the height of its centre.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HeightProfile {
    pub ratio: f64,

    /// Units: feet
    pub height: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Colour space the plane bounds are applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Hsv,
    Hsl,
    Rgb,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            camera_address: String::new(),
            camera_view_angle_deg: 43.5,
            camera_boot_time_s: 30.0,
            poll_period_s: 0.005,
            save_sample_image: true,
            threshold_type: ThresholdType::Hsv,
            plane_1: ChannelBounds::new(0, 50),
            plane_2: ChannelBounds::new(50, 255),
            plane_3: ChannelBounds::new(0, 50),
            small_object_erosions: 2,
            rectangle_ratio_min: 1.0,
            rectangle_ratio_max: 3.2,
            rectangle_score_threshold: 80.0,
            target_width: 2.0,
            rectangle_ratio_threshold: 0.4,
            high_profile: HeightProfile {
                ratio: 62.0 / 20.0,
                height: 9.177083,
            },
            medium_profile: HeightProfile {
                ratio: 62.0 / 29.0,
                height: 8.2604167,
            },
            low_profile: HeightProfile {
                ratio: 37.0 / 32.0,
                height: 2.583,
            },
            horizontal_angle_offset_deg: 0.0,
            vertical_angle_offset_deg: 0.0,
            distance_offset: 0.0,
        }
    }
}

impl ChannelBounds {
    pub fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: u8) -> bool {
        value >= self.low && value <= self.high
    }
}
