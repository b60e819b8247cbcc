//! # Camera Equipment Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A frame acquired from the camera.
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: DynamicImage
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Faults reported by a camera.
#[derive(Debug, Error)]
pub enum CamError {
    #[error("No image has been acquired yet")]
    NoImage,

    #[error("The camera is not connected")]
    NotConnected,

    #[error("Camera driver fault: {0}")]
    DriverFault(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A camera which acquires frames in the background.
///
/// Implementations must be `Send` so that the camera can be handed to the
/// vision worker thread.
pub trait Camera: Send {
    /// Returns true if a frame has arrived since the last call to `get_image`.
    fn is_fresh_image(&self) -> bool;

    /// Take the most recent frame, clearing the fresh flag.
    fn get_image(&mut self) -> Result<CamImage, CamError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Wrap an RGB image with the current time.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            timestamp: Utc::now(),
            image: DynamicImage::ImageRgb8(image)
        }
    }

    /// Width and height of the frame in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        use image::GenericImageView;
        self.image.dimensions()
    }
}
