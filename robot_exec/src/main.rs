//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Tick time and operator input acquisition
//!         - Robot processing:
//!             - Sensor sampling
//!             - Mode handling
//!             - Autonomous script or operator control with routines
//!         - Archiving
//!         - Cycle management
//!
//! Without hardware the equipment is simulated, the field mode is taken from
//! the command line and both controllers are left idle.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use robot_lib::{
    cmd::RobotMode,
    data_store::{DataStore, SafeModeCause},
    robot::{Robot, Subsystems},
    targeting::Targeting,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use eqpt_if::{input::GamepadState, sim::SimEqpt};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of consecutive overruns after which the robot is made safe.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 50;

// ---------------------------------------------------------------------------
// STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "robot_exec", about = "Robot control executable")]
struct Opts {
    /// Directory holding the autonomous scripts, overrides the parameter
    /// file.
    #[structopt(short, long, parse(from_os_str))]
    script_dir: Option<PathBuf>,

    /// Stop after this many cycles.
    #[structopt(short = "n", long)]
    max_cycles: Option<u64>,

    /// Field mode to run in.
    #[structopt(
        short,
        long,
        default_value = "disabled",
        possible_values = &["disabled", "autonomous", "teleop"]
    )]
    mode: String,

    /// Minimum log level.
    #[structopt(
        short,
        long,
        default_value = "info",
        possible_values = &["info", "debug", "trace"]
    )]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    let mode = match opts.mode.as_str() {
        "autonomous" => RobotMode::Autonomous,
        "teleop" => RobotMode::Teleop,
        _ => RobotMode::Disabled,
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut eqpt = SimEqpt::new();

    let subs = Subsystems::from_files(&mut eqpt).wrap_err("Failed to initialise the subsystems")?;

    let targeting = Targeting::from_file(
        "targeting.toml",
        &mut eqpt,
        Some(session.session_root.join("target_sample.png")),
    )
    .wrap_err("Failed to initialise Targeting")?;
    info!("Targeting init complete");

    let mut robot = Robot::from_file("robot_exec.toml", subs, targeting)
        .wrap_err("Failed to load the Robot parameters")?;

    let script_dir = match opts.script_dir {
        Some(d) => d,
        None => host::get_robot_sw_root()
            .wrap_err("Cannot locate the script directory")?
            .join(&robot.params().script_dir),
    };

    robot
        .init(script_dir, &session)
        .wrap_err("Failed to initialise the Robot")?;
    info!("Robot init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE DATASTORE ----

    let mut ds = DataStore::new(robot);
    ds.robot_input.mode = mode;
    ds.robot_input.driver = GamepadState::default();
    ds.robot_input.scoring = GamepadState::default();

    // ---- MAIN LOOP ----

    info!("Beginning main loop in {:?}\n", mode);

    loop {
        if let Some(max) = opts.max_cycles {
            if ds.num_cycles >= max {
                info!("Cycle limit of {} reached, stopping", max);
                break;
            }
        }

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        ds.cycle_start(session::get_elapsed_seconds());

        // ---- ROBOT PROCESSING ----

        match ds.robot.proc(&ds.robot_input) {
            Ok((o, r)) => {
                ds.robot_output = o;
                ds.robot_status_rpt = r;
                ds.make_unsafe(SafeModeCause::RobotProcError).ok();
            }
            Err(e) => {
                error!("Error during Robot processing: {}", e);
                ds.make_safe(SafeModeCause::RobotProcError);
            }
        }

        // Hold everything in neutral while safe
        if let Some(cause) = ds.safe_cause {
            ds.make_safe(cause);
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.robot.write() {
            warn!("Could not write the Robot archive: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                ds.make_unsafe(SafeModeCause::ConsecutiveOverruns).ok();
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    ds.make_safe(SafeModeCause::ConsecutiveOverruns);
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    ds.robot.make_safe();

    info!("End of execution");

    session.exit();

    Ok(())
}
