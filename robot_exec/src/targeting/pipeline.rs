//! # Target segmentation pipeline
//!
//! One pass turns a colour frame into a target snapshot:
//!
//! 1. Threshold each pixel against three colour plane bounds, in HSV, HSL or
//!    RGB, producing a binary mask.
//! 2. Remove small blobs: a blob is kept only if some of it survives a fixed
//!    number of erosions.
//! 3. Fill holes, so ring shaped targets become solid and the rectangularity
//!    score is meaningful.
//! 4. Label the 8-connected blobs and turn each into a detection.
//! 5. Filter and order the detections into a snapshot.
//!
//! Masks are `GrayImage`s holding 0 or `SET`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{GrayImage, Luma, RgbImage};

use super::{ChannelBounds, Params, TargetDetection, TargetSnapshot, ThresholdType};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Value of a set mask pixel.
pub const SET: u8 = 255;

const NEIGHBOURS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const NEIGHBOURS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the full pipeline on one frame.
pub fn process(frame: &RgbImage, params: &Params) -> TargetSnapshot {
    let mask = threshold(frame, params);
    let mask = remove_small_objects(&mask, params.small_object_erosions);
    let mask = fill_holes(&mask);

    let (width, height) = mask.dimensions();

    let detections = connected_components(&mask)
        .iter()
        .filter_map(|c| TargetDetection::from_pixels(c, width, height))
        .collect();

    TargetSnapshot::from_detections(detections, params)
}

/// Threshold a frame into a binary mask.
pub fn threshold(frame: &RgbImage, params: &Params) -> GrayImage {
    let bounds = [params.plane_1, params.plane_2, params.plane_3];

    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;

        let planes = match params.threshold_type {
            ThresholdType::Hsv => rgb_to_hsv(r, g, b),
            ThresholdType::Hsl => rgb_to_hsl(r, g, b),
            ThresholdType::Rgb => [r, g, b],
        };

        if in_bounds(&planes, &bounds) {
            Luma([SET])
        } else {
            Luma([0])
        }
    })
}

/// Keep only the blobs which still have at least one pixel after `erosions`
/// erosions.
pub fn remove_small_objects(mask: &GrayImage, erosions: u32) -> GrayImage {
    let mut eroded = mask.clone();
    for _ in 0..erosions {
        eroded = erode(&eroded);
    }

    let mut out = GrayImage::new(mask.width(), mask.height());

    for component in connected_components(mask) {
        let survives = component
            .iter()
            .any(|&(x, y)| eroded.get_pixel(x, y).0[0] == SET);

        if survives {
            for (x, y) in component {
                out.put_pixel(x, y, Luma([SET]));
            }
        }
    }

    out
}

/// Fill every background region not connected to the image border.
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut outside = vec![false; (width * height) as usize];
    let mut stack = Vec::new();

    // Seed the flood with every background border pixel
    for x in 0..width {
        stack.push((x, 0));
        stack.push((x, height.saturating_sub(1)));
    }
    for y in 0..height {
        stack.push((0, y));
        stack.push((width.saturating_sub(1), y));
    }

    while let Some((x, y)) = stack.pop() {
        if x >= width || y >= height {
            continue;
        }
        let idx = (y * width + x) as usize;
        if outside[idx] || mask.get_pixel(x, y).0[0] == SET {
            continue;
        }
        outside[idx] = true;

        stack.extend(neighbours(x, y, width, height, &NEIGHBOURS_4));
    }

    GrayImage::from_fn(width, height, |x, y| {
        if outside[(y * width + x) as usize] {
            Luma([0])
        } else {
            Luma([SET])
        }
    })
}

/// Label the 8-connected blobs of a mask, returning the pixels of each.
pub fn connected_components(mask: &GrayImage) -> Vec<Vec<(u32, u32)>> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; (width * height) as usize];
    let mut components = Vec::new();

    for (sx, sy, px) in mask.enumerate_pixels() {
        if px.0[0] != SET || visited[(sy * width + sx) as usize] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![(sx, sy)];

        while let Some((x, y)) = stack.pop() {
            let idx = (y * width + x) as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            component.push((x, y));

            for (nx, ny) in neighbours(x, y, width, height, &NEIGHBOURS_8) {
                if !visited[(ny * width + nx) as usize] && mask.get_pixel(nx, ny).0[0] == SET {
                    stack.push((nx, ny));
                }
            }
        }

        components.push(component);
    }

    components
}

/// Convert to hue, saturation and value, each scaled to 0..=255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (max, min) = max_min(r, g, b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };

    [hue(r, g, b), to_u8(s), to_u8(max)]
}

/// Convert to hue, saturation and luminance, each scaled to 0..=255.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (max, min) = max_min(r, g, b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };

    [hue(r, g, b), to_u8(s), to_u8(l)]
}

fn in_bounds(planes: &[u8; 3], bounds: &[ChannelBounds; 3]) -> bool {
    planes.iter().zip(bounds.iter()).all(|(v, b)| b.contains(*v))
}

/// A pixel survives if it and all 8 neighbours are set. Pixels outside the
/// image count as unset.
fn erode(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();

    GrayImage::from_fn(width, height, |x, y| {
        let interior = x > 0 && y > 0 && x + 1 < width && y + 1 < height;

        let keep = interior
            && mask.get_pixel(x, y).0[0] == SET
            && neighbours(x, y, width, height, &NEIGHBOURS_8)
                .all(|(nx, ny)| mask.get_pixel(nx, ny).0[0] == SET);

        if keep {
            Luma([SET])
        } else {
            Luma([0])
        }
    })
}

fn neighbours<'a>(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    offsets: &'a [(i64, i64)],
) -> impl Iterator<Item = (u32, u32)> + 'a {
    offsets.iter().filter_map(move |(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            None
        } else {
            Some((nx as u32, ny as u32))
        }
    })
}

fn max_min(r: u8, g: u8, b: u8) -> (f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    (r.max(g).max(b), r.min(g).min(b))
}

fn hue(r: u8, g: u8, b: u8) -> u8 {
    let (max, min) = max_min(r, g, b);
    let delta = max - min;

    if delta == 0.0 {
        return 0;
    }

    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);

    let deg = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    to_u8(deg / 360.0)
}

fn to_u8(unit: f64) -> u8 {
    (unit * 255.0).round().max(0.0).min(255.0) as u8
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    const GREEN: Rgb<u8> = Rgb([10, 230, 20]);

    fn green_params() -> Params {
        Params {
            threshold_type: ThresholdType::Rgb,
            plane_1: ChannelBounds::new(0, 50),
            plane_2: ChannelBounds::new(200, 255),
            plane_3: ChannelBounds::new(0, 50),
            ..Params::default()
        }
    }

    fn draw_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, border: Option<u32>) {
        for j in y..y + h {
            for i in x..x + w {
                let on_border = match border {
                    Some(t) => i < x + t || i >= x + w - t || j < y + t || j >= y + h - t,
                    None => true,
                };
                if on_border {
                    img.put_pixel(i, j, GREEN);
                }
            }
        }
    }

    #[test]
    fn test_colour_conversions() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [85, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsl(255, 255, 255), [0, 0, 255]);
        assert_eq!(rgb_to_hsl(0, 0, 255), [170, 255, 128]);
    }

    #[test]
    fn test_fill_holes() {
        let mut mask = GrayImage::new(10, 10);
        for i in 2..8 {
            mask.put_pixel(i, 2, Luma([SET]));
            mask.put_pixel(i, 7, Luma([SET]));
            mask.put_pixel(2, i, Luma([SET]));
            mask.put_pixel(7, i, Luma([SET]));
        }

        let filled = fill_holes(&mask);

        assert_eq!(filled.get_pixel(4, 4).0[0], SET);
        assert_eq!(filled.get_pixel(0, 0).0[0], 0);
        assert_eq!(filled.get_pixel(9, 5).0[0], 0);
    }

    #[test]
    fn test_remove_small_objects() {
        let mut mask = GrayImage::new(20, 20);
        // 3x3 blob vanishes after two erosions
        for j in 1..4 {
            for i in 1..4 {
                mask.put_pixel(i, j, Luma([SET]));
            }
        }
        // 5x5 blob keeps its centre
        for j in 10..15 {
            for i in 10..15 {
                mask.put_pixel(i, j, Luma([SET]));
            }
        }

        let out = remove_small_objects(&mask, 2);

        assert_eq!(out.get_pixel(2, 2).0[0], 0);
        assert_eq!(out.get_pixel(10, 10).0[0], SET);
        assert_eq!(connected_components(&out).len(), 1);
    }

    #[test]
    fn test_process_frame() {
        let mut img = RgbImage::new(160, 120);

        // Ring target, becomes solid once filled
        draw_rect(&mut img, 20, 20, 50, 20, Some(5));
        // Solid square lower down
        draw_rect(&mut img, 100, 70, 20, 20, None);
        // Noise
        draw_rect(&mut img, 5, 100, 3, 3, None);
        img.put_pixel(150, 10, GREEN);

        let snap = process(&img, &green_params());

        assert_eq!(snap.len(), 2);

        let ring = &snap.detections()[0];
        assert_eq!(ring.rect.width, 50);
        assert_eq!(ring.rect.height, 20);
        assert_eq!(ring.score, 100.0);
        assert_eq!(ring.aspect_ratio, 2.5);

        assert_eq!(snap.detections()[1].rect.y, 70);
    }
}
