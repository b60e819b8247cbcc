//! # Targeting
//!
//! Camera based target acquisition. A background worker repeatedly pulls
//! fresh frames from the camera, segments them and publishes a
//! [`TargetSnapshot`]. The control loop copies the latest snapshot out
//! whenever it needs one and never holds the lock while using it.
//!
//! The geometry functions convert a detection into the angles and distance
//! used to aim the robot.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod detection;
pub mod geometry;
mod params;
pub mod pipeline;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
};

use eqpt_if::{cam::CamError, EqptBuilder};
use log::{debug, info, warn};

pub use detection::*;
pub use params::*;

use crate::{cmd::RobotMode, drive_train::enabled_str};
use worker::worker_thread;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Front end to the targeting worker.
pub struct Targeting {
    shared: Arc<Shared>,

    worker_jh: Option<JoinHandle<()>>,
}

/// State shared with the worker thread.
struct Shared {
    params: Params,

    /// Cleared to stop the worker.
    run: AtomicBool,

    /// Set while the robot is enabled.
    searching: AtomicBool,

    /// Latest published snapshot, replaced whole.
    snapshot: Mutex<Option<Arc<TargetSnapshot>>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TargetingError {
    #[error("Failed to load Targeting parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Camera error: {0}")]
    CamError(CamError),

    #[error("Snapshot lock is poisoned")]
    PoisonError,

    #[error("Could not start the targeting worker: {0}")]
    WorkerSpawnError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Targeting {
    /// Create the targeting front end, starting the worker if a camera is
    /// fitted.
    ///
    /// If `sample_path` is given and sample saving is enabled the first
    /// processed frame is written there as a PNG.
    pub fn new(
        params: Params,
        eqpt: &mut dyn EqptBuilder,
        sample_path: Option<PathBuf>,
    ) -> Result<Self, TargetingError> {
        let camera = eqpt.camera(&params.camera_address);

        info!("Targeting created: camera {}", enabled_str(camera.is_some()));

        let sample_path = if params.save_sample_image {
            sample_path
        } else {
            None
        };

        let shared = Arc::new(Shared {
            params,
            run: AtomicBool::new(true),
            searching: AtomicBool::new(false),
            snapshot: Mutex::new(None),
        });

        let worker_jh = match camera {
            Some(cam) => {
                let shared_worker = shared.clone();
                let jh = thread::Builder::new()
                    .name("targeting::worker".into())
                    .spawn(move || worker_thread(shared_worker, cam, sample_path))
                    .map_err(TargetingError::WorkerSpawnError)?;
                Some(jh)
            }
            None => None,
        };

        Ok(Self { shared, worker_jh })
    }

    pub fn from_file(
        param_file: &str,
        eqpt: &mut dyn EqptBuilder,
        sample_path: Option<PathBuf>,
    ) -> Result<Self, TargetingError> {
        let params = util::params::load(param_file).map_err(TargetingError::ParamLoadError)?;
        Self::new(params, eqpt, sample_path)
    }

    pub fn is_enabled(&self) -> bool {
        self.worker_jh.is_some()
    }

    pub fn params(&self) -> &Params {
        &self.shared.params
    }

    /// Search for targets only while the robot is enabled.
    pub fn set_robot_state(&mut self, mode: RobotMode) {
        let searching = mode != RobotMode::Disabled;
        self.shared.searching.store(searching, Ordering::Relaxed);

        debug!("Targeting searching: {}", searching);
    }

    pub fn is_searching(&self) -> bool {
        self.shared.searching.load(Ordering::Relaxed)
    }

    /// The latest snapshot, if any frame has been processed yet.
    pub fn snapshot(&self) -> Result<Option<Arc<TargetSnapshot>>, TargetingError> {
        Ok(self.shared.snapshot.lock()?.clone())
    }

    /// Publish a snapshot as if the worker had found it.
    #[cfg(test)]
    pub(crate) fn publish(&self, snapshot: TargetSnapshot) -> Result<(), TargetingError> {
        self.shared.publish(snapshot)
    }

    pub fn current_state(&self) -> String {
        match self.snapshot() {
            Ok(Some(s)) => format!(
                "Targeting: searching {}, {} targets at {}",
                self.is_searching(),
                s.len(),
                s.timestamp
            ),
            Ok(None) => format!("Targeting: searching {}, no snapshot", self.is_searching()),
            Err(e) => format!("Targeting: {}", e),
        }
    }
}

impl Shared {
    /// Replace the published snapshot whole.
    fn publish(&self, snapshot: TargetSnapshot) -> Result<(), TargetingError> {
        *self.snapshot.lock()? = Some(Arc::new(snapshot));
        Ok(())
    }
}

impl Drop for Targeting {
    fn drop(&mut self) {
        self.shared.run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.worker_jh.take() {
            if jh.join().is_err() {
                warn!("Targeting worker panicked");
            }
        }
    }
}

impl<G> From<PoisonError<G>> for TargetingError {
    fn from(_: PoisonError<G>) -> Self {
        Self::PoisonError
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
