//! Target detections and snapshots

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::Serialize;

use util::maths::lin_map;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pixel bounding rectangle, inclusive of its first row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One candidate target found in a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetDetection {
    pub rect: BoundingRect,

    /// Units: pixels
    pub center_mass_x: f64,

    /// Units: pixels
    pub center_mass_y: f64,

    /// Centre of mass x across the field of view, -1 at the left edge and +1
    /// at the right.
    pub center_mass_x_normalized: f64,

    /// Number of filled pixels.
    pub area: u32,

    /// Bounding width over bounding height.
    pub aspect_ratio: f64,

    /// Filled area as a percentage of the bounding rectangle area.
    pub score: f64,

    pub image_width: u32,

    pub image_height: u32,
}

/// The filtered detections from one frame, ordered top to bottom.
#[derive(Debug, Clone, Serialize)]
pub struct TargetSnapshot {
    pub timestamp: DateTime<Utc>,

    detections: Vec<TargetDetection>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Physical height class of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetHeight {
    High,
    Medium,
    Low,
    Unknown,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TargetDetection {
    /// Build a detection from the pixels of one connected component.
    ///
    /// Returns `None` for an empty component.
    pub fn from_pixels(pixels: &[(u32, u32)], image_width: u32, image_height: u32) -> Option<Self> {
        if pixels.is_empty() {
            return None;
        }

        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;

        for &(x, y) in pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            sum_x += x as f64;
            sum_y += y as f64;
        }

        let area = pixels.len() as u32;
        let rect = BoundingRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        };

        let center_mass_x = sum_x / area as f64;
        let center_mass_y = sum_y / area as f64;

        Some(Self {
            rect,
            center_mass_x,
            center_mass_y,
            center_mass_x_normalized: lin_map(
                (0.0, image_width as f64),
                (-1.0, 1.0),
                center_mass_x,
            ),
            area,
            aspect_ratio: rect.width as f64 / rect.height as f64,
            score: area as f64 / (rect.width as f64 * rect.height as f64) * 100.0,
            image_width,
            image_height,
        })
    }
}

impl TargetSnapshot {
    /// Filter raw detections by aspect ratio band and rectangularity score,
    /// then order them by ascending vertical centre of mass.
    pub fn from_detections(mut detections: Vec<TargetDetection>, params: &Params) -> Self {
        detections.retain(|d| {
            d.aspect_ratio >= params.rectangle_ratio_min
                && d.aspect_ratio <= params.rectangle_ratio_max
                && d.score > params.rectangle_score_threshold
        });

        Self::new(detections)
    }

    /// Build a snapshot from already filtered detections.
    pub fn new(mut detections: Vec<TargetDetection>) -> Self {
        detections.sort_by_key(|d| OrderedFloat(d.center_mass_y));

        Self {
            timestamp: Utc::now(),
            detections,
        }
    }

    pub fn detections(&self) -> &[TargetDetection] {
        &self.detections
    }

    pub fn get(&self, index: usize) -> Option<&TargetDetection> {
        self.detections.get(index)
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl TargetHeight {
    /// Decode a script height parameter.
    pub fn from_script(value: f64) -> Self {
        match value {
            v if v == 0.0 => TargetHeight::Low,
            v if v == 1.0 => TargetHeight::Medium,
            v if v == 2.0 => TargetHeight::High,
            _ => TargetHeight::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Solid rectangle of pixels.
    fn rect_pixels(x: u32, y: u32, w: u32, h: u32) -> Vec<(u32, u32)> {
        let mut px = Vec::new();
        for j in y..y + h {
            for i in x..x + w {
                px.push((i, j));
            }
        }
        px
    }

    #[test]
    fn test_from_pixels() {
        let det = TargetDetection::from_pixels(&rect_pixels(10, 20, 40, 20), 160, 120).unwrap();

        assert_eq!(
            det.rect,
            BoundingRect {
                x: 10,
                y: 20,
                width: 40,
                height: 20
            }
        );
        assert_eq!(det.area, 800);
        assert_eq!(det.aspect_ratio, 2.0);
        assert_eq!(det.score, 100.0);
        assert_eq!(det.center_mass_x, 29.5);
        assert!((det.center_mass_x_normalized - (29.5 / 80.0 - 1.0)).abs() < 1e-12);

        assert!(TargetDetection::from_pixels(&[], 160, 120).is_none());
    }

    #[test]
    fn test_snapshot_filter_and_order() {
        let params = Params::default();

        let mut dets = vec![
            // Good, lower in the image
            TargetDetection::from_pixels(&rect_pixels(0, 80, 30, 15), 160, 120).unwrap(),
            // Too tall
            TargetDetection::from_pixels(&rect_pixels(0, 0, 10, 30), 160, 120).unwrap(),
            // Good, higher in the image
            TargetDetection::from_pixels(&rect_pixels(50, 10, 40, 20), 160, 120).unwrap(),
        ];

        // An L shape scores 75, below the threshold
        let mut l_shape = rect_pixels(100, 50, 20, 10);
        l_shape.retain(|&(x, y)| !(x >= 110 && y >= 55));
        dets.push(TargetDetection::from_pixels(&l_shape, 160, 120).unwrap());

        let snap = TargetSnapshot::from_detections(dets, &params);

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.detections()[0].rect.y, 10);
        assert_eq!(snap.detections()[1].rect.y, 80);
    }

    #[test]
    fn test_height_from_script() {
        assert_eq!(TargetHeight::from_script(0.0), TargetHeight::Low);
        assert_eq!(TargetHeight::from_script(2.0), TargetHeight::High);
        assert_eq!(TargetHeight::from_script(7.0), TargetHeight::Unknown);
    }
}
