//! Worker thread running the segmentation pipeline without blocking the
//! control loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    path::PathBuf,
    sync::{atomic::Ordering, Arc},
    thread,
    time::{Duration, Instant},
};

use eqpt_if::cam::Camera;
use log::{debug, info, warn};

use super::{pipeline, Shared, TargetingError};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Acquire and process frames until the run flag is cleared.
///
/// Per-cycle faults are logged and the loop carries on, the previously
/// published snapshot stays valid.
pub(super) fn worker_thread(
    shared: Arc<Shared>,
    mut camera: Box<dyn Camera>,
    mut sample_path: Option<PathBuf>,
) {
    let started = Instant::now();
    let boot_time = Duration::from_secs_f64(shared.params.camera_boot_time_s.max(0.0));
    let poll_period = Duration::from_secs_f64(shared.params.poll_period_s.max(0.0));
    let mut booted = false;

    info!("Targeting worker started");

    while shared.run.load(Ordering::Relaxed) {
        if !shared.searching.load(Ordering::Relaxed) {
            thread::sleep(poll_period);
            continue;
        }

        // Give the camera time to boot before talking to it
        if !booted {
            if started.elapsed() < boot_time {
                thread::sleep(poll_period);
                continue;
            }
            info!("Camera boot time elapsed, searching for targets");
            booted = true;
        }

        match find_targets(&shared, camera.as_mut(), &mut sample_path) {
            Ok(true) => (),
            Ok(false) => thread::sleep(poll_period),
            Err(e) => {
                warn!("Error in targeting worker: {}", e);
                thread::sleep(poll_period);
            }
        }
    }

    info!("Targeting worker stopped");
}

/// Process one frame if a fresh one is available, returning whether a new
/// snapshot was published.
fn find_targets(
    shared: &Shared,
    camera: &mut dyn Camera,
    sample_path: &mut Option<PathBuf>,
) -> Result<bool, TargetingError> {
    if !camera.is_fresh_image() {
        return Ok(false);
    }

    let frame = camera.get_image().map_err(TargetingError::CamError)?;
    let rgb = frame.image.to_rgb8();

    if let Some(path) = sample_path.take() {
        match rgb.save(&path) {
            Ok(_) => info!("Sample image saved to {:?}", path),
            Err(e) => warn!("Could not save sample image to {:?}: {}", path, e),
        }
    }

    let snapshot = pipeline::process(&rgb, &shared.params);

    debug!("Found {} targets", snapshot.len());

    shared.publish(snapshot)?;

    Ok(true)
}
