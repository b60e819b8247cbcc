//! Target geometry derived from a detection and the camera calibration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ordered_float::OrderedFloat;
use util::maths::deg_to_rad;

use super::{Params, TargetDetection, TargetHeight};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Angle of the target from the camera centreline, positive to the right.
///
/// Units: degrees
pub fn horizontal_angle_deg(target: &TargetDetection, params: &Params) -> f64 {
    target.center_mass_x_normalized * params.camera_view_angle_deg / 2.0
        + params.horizontal_angle_offset_deg
}

/// Distance to the target estimated from its apparent width.
///
/// Units: feet
pub fn distance(target: &TargetDetection, params: &Params) -> f64 {
    // Width of the whole field of view at the target's range
    let fov_width = params.target_width * target.image_width as f64 / target.rect.width as f64;

    (fov_width / 2.0) / (deg_to_rad(params.camera_view_angle_deg) / 2.0).tan()
}

/// Classify the target by matching its aspect ratio against the calibrated
/// profiles. The closest matching profile wins.
pub fn classify_height(aspect_ratio: f64, params: &Params) -> TargetHeight {
    let profiles = [
        (TargetHeight::High, params.high_profile),
        (TargetHeight::Medium, params.medium_profile),
        (TargetHeight::Low, params.low_profile),
    ];

    profiles
        .iter()
        .map(|(h, p)| (*h, (aspect_ratio - p.ratio).abs()))
        .filter(|(_, diff)| *diff < params.rectangle_ratio_threshold)
        .min_by_key(|(_, diff)| OrderedFloat(*diff))
        .map(|(h, _)| h)
        .unwrap_or(TargetHeight::Unknown)
}

/// Physical height of a height class.
///
/// Units: feet
pub fn height_of(height: TargetHeight, params: &Params) -> Option<f64> {
    match height {
        TargetHeight::High => Some(params.high_profile.height),
        TargetHeight::Medium => Some(params.medium_profile.height),
        TargetHeight::Low => Some(params.low_profile.height),
        TargetHeight::Unknown => None,
    }
}

/// Elevation of the target above the camera, `None` if its height is
/// unknown.
///
/// Units: degrees
pub fn vertical_angle_deg(target: &TargetDetection, params: &Params) -> Option<f64> {
    let height = height_of(classify_height(target.aspect_ratio, params), params)?;
    let distance = distance(target, params) + params.distance_offset;

    Some((height / distance).atan().to_degrees() + params.vertical_angle_offset_deg)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::targeting::detection::BoundingRect;

    fn detection(width: u32, height: u32, cmx: f64) -> TargetDetection {
        TargetDetection {
            rect: BoundingRect {
                x: 0,
                y: 0,
                width,
                height,
            },
            center_mass_x: cmx,
            center_mass_y: 10.0,
            center_mass_x_normalized: cmx / 160.0 - 1.0,
            area: width * height,
            aspect_ratio: width as f64 / height as f64,
            score: 100.0,
            image_width: 320,
            image_height: 240,
        }
    }

    #[test]
    fn test_classify_height() {
        let params = Params::default();

        // Exactly the high profile
        assert_eq!(classify_height(3.1, &params), TargetHeight::High);
        assert_eq!(
            height_of(classify_height(3.1, &params), &params),
            Some(9.177083)
        );

        assert_eq!(classify_height(2.2, &params), TargetHeight::Medium);
        assert_eq!(classify_height(1.1, &params), TargetHeight::Low);
        assert_eq!(classify_height(5.0, &params), TargetHeight::Unknown);

        // With a wide threshold 2.55 matches both high and medium, medium is
        // closer
        let wide = Params {
            rectangle_ratio_threshold: 0.6,
            ..Params::default()
        };
        assert_eq!(classify_height(2.55, &wide), TargetHeight::Medium);
    }

    #[test]
    fn test_horizontal_angle() {
        let params = Params::default();

        assert!(horizontal_angle_deg(&detection(62, 20, 160.0), &params).abs() < 1e-12);
        assert!((horizontal_angle_deg(&detection(62, 20, 320.0), &params) - 21.75).abs() < 1e-12);
        assert!((horizontal_angle_deg(&detection(62, 20, 0.0), &params) + 21.75).abs() < 1e-12);
    }

    #[test]
    fn test_distance_and_vertical_angle() {
        let params = Params {
            camera_view_angle_deg: 90.0,
            ..Params::default()
        };

        // Target fills a tenth of the view: view is 20 ft wide, 10 ft away
        let det = detection(32, 32, 160.0);
        assert!((distance(&det, &params) - 10.0).abs() < 1e-9);

        // Ratio 1.0 matches the low profile
        let angle = vertical_angle_deg(&det, &params).unwrap();
        assert!((angle - (2.583f64 / 10.0).atan().to_degrees()).abs() < 1e-9);

        // Unknown height has no vertical angle
        assert!(vertical_angle_deg(&detection(100, 20, 160.0), &params).is_none());
    }
}
