//! Implementations for the Robot state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use eqpt_if::input::{Button, GamepadState};
use log::{info, trace, warn};
use serde::Serialize;

use super::{
    autonomous::ScriptRunner,
    input::ControllerEdges,
    routines::{RoutineCtx, Routines, TargetContext},
    teleop, Params, RobotError, Subsystems,
};
use crate::{cmd::RobotMode, targeting::Targeting};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    logger,
    module::State,
    script_interpreter::ScriptSelector,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Robot module state
pub struct Robot {
    params: Params,

    pub(crate) subs: Subsystems,

    targeting: Targeting,

    /// Targets captured for aiming, private to the control loop.
    targets: TargetContext,

    pub(crate) routines: Routines,

    pub(crate) runner: ScriptRunner,

    selector: ScriptSelector,

    mode: RobotMode,

    driver: ControllerEdges,
    scoring: ControllerEdges,

    detailed_logging: bool,

    num_cycles: u64,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data for one cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Tick time of this cycle.
    ///
    /// Units: seconds
    pub now_s: f64,

    /// Mode requested by the field.
    pub mode: RobotMode,

    pub driver: GamepadState,

    pub scoring: GamepadState,
}

/// The commands left on each actuator at the end of the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    pub drive_linear: f64,
    pub drive_turn: f64,
    pub pitch: f64,
    pub winch: f64,
    pub wheel: f64,
    pub piston_out: bool,
}

/// Status report for one cycle, archived as a flat CSV row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub cycle: u64,

    /// Units: seconds
    pub time_s: f64,

    pub mode: RobotMode,

    /// Current script action, `none` outside autonomous.
    pub action: String,

    pub script_cursor: Option<usize>,

    /// Names of the active routines separated by spaces.
    pub active_routines: String,

    pub drive_linear: f64,
    pub drive_turn: f64,
    pub pitch: f64,
    pub winch: f64,
    pub wheel: f64,
    pub piston_out: bool,

    pub pitch_count: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    /// Build the robot from its already constructed parts. No scripts are
    /// available until [`Robot::discover_scripts`] is called.
    pub fn new(params: Params, subs: Subsystems, targeting: Targeting) -> Self {
        let targets = TargetContext::new(targeting.params().clone());

        Self {
            params,
            subs,
            targeting,
            targets,
            routines: Routines::new(),
            runner: ScriptRunner::new(),
            selector: ScriptSelector::default(),
            mode: RobotMode::Disabled,
            driver: ControllerEdges::default(),
            scoring: ControllerEdges::default(),
            detailed_logging: false,
            num_cycles: 0,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    pub fn from_file(
        param_file: &str,
        subs: Subsystems,
        targeting: Targeting,
    ) -> Result<Self, RobotError> {
        let params = util::params::load(param_file).map_err(RobotError::ParamLoadError)?;
        Ok(Self::new(params, subs, targeting))
    }

    /// List the scripts available in the directory.
    pub fn discover_scripts<P: AsRef<Path>>(&mut self, dir: P) -> Result<(), RobotError> {
        self.selector = ScriptSelector::discover(dir.as_ref()).map_err(RobotError::ScriptError)?;

        info!(
            "Found {} autonomous scripts in {:?}, selected {:?}",
            self.selector.len(),
            dir.as_ref(),
            self.selector.selected()
        );

        Ok(())
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn is_detailed_logging(&self) -> bool {
        self.detailed_logging
    }

    pub fn selected_script(&self) -> Option<&Path> {
        self.selector.selected()
    }

    // ---- PRIVATE ----

    /// Mode entry actions.
    fn enter_mode(&mut self, mode: RobotMode) {
        info!("Robot mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        self.subs.set_robot_state(mode);
        self.targeting.set_robot_state(mode);

        self.routines.finish_all();
        self.subs.all_neutral();

        match mode {
            RobotMode::Autonomous => match self.selector.load_selected() {
                Ok(s) => self.runner.load(s),
                Err(e) => {
                    warn!("No autonomous script will run: {}", e);
                    self.runner.unload();
                }
            },
            _ => self.runner.unload(),
        }
    }

    /// Buttons on the driver controller that work in every mode.
    fn utility_buttons(&mut self) {
        if self.driver.pressed(Button::B) {
            self.detailed_logging = !self.detailed_logging;
            logger::set_detailed(self.detailed_logging);
        }

        if self.driver.pressed(Button::Back) {
            self.log_diagnostics();
        }
    }

    fn log_diagnostics(&self) {
        info!("Diagnostics:");
        for line in self.subs.current_states() {
            info!("    {}", line);
        }
        info!("    {}", self.targeting.current_state());

        match self.targeting.snapshot() {
            Ok(Some(s)) => session::save_with_timestamp("targets.json", (*s).clone()),
            Ok(None) => (),
            Err(e) => warn!("Could not read the target snapshot: {}", e),
        }
    }

    fn disabled(&mut self) {
        if self.driver.pressed(Button::Start) {
            match self.selector.cycle() {
                Some(p) => info!("Selected autonomous script {:?}", p),
                None => warn!("No autonomous scripts to select from"),
            }
        }

        self.routines.finish_all();
        self.subs.all_neutral();
    }

    fn output(&self) -> OutputData {
        let drive = self.subs.drive_train.demand();

        OutputData {
            drive_linear: drive.linear,
            drive_turn: drive.turn,
            pitch: self.subs.shooter.pitch_demand(),
            winch: self.subs.climber.demand(),
            wheel: self.subs.shooter.wheel_demand(),
            piston_out: self.subs.feeder.piston_out(),
        }
    }
}

impl State for Robot {
    /// Directory holding the autonomous scripts.
    type InitData = PathBuf;
    type InitError = RobotError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = RobotError;

    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.arch_report = Archiver::from_path(session, "robot/status_report.csv")
            .map_err(RobotError::ArchiveError)?;

        // Running without scripts is allowed, autonomous just does nothing
        if let Err(e) = self.discover_scripts(&init_data) {
            warn!("{}", e);
        }

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let now_s = input_data.now_s;

        self.driver.update(input_data.driver);
        self.scoring.update(input_data.scoring);

        self.subs.read_sensors(now_s);

        if input_data.mode != self.mode {
            self.enter_mode(input_data.mode);
        }

        self.utility_buttons();

        if self.detailed_logging {
            for line in self.subs.current_states() {
                trace!("{}", line);
            }
        }

        if self.mode == RobotMode::Disabled {
            self.disabled();
        } else {
            let latest = match self.targeting.snapshot() {
                Ok(s) => s,
                Err(e) => {
                    warn!("Targets unavailable this cycle: {}", e);
                    None
                }
            };

            let mut ctx = RoutineCtx {
                subs: &mut self.subs,
                targets: &mut self.targets,
                params: &self.params,
                latest,
                now_s,
            };

            if self.mode == RobotMode::Autonomous {
                self.runner.step(&mut ctx, &mut self.routines);
            } else {
                teleop::step(&mut ctx, &mut self.routines, &self.driver, &self.scoring);
            }
        }

        let output = self.output();

        self.report = StatusReport {
            cycle: self.num_cycles,
            time_s: now_s,
            mode: self.mode,
            action: self.runner.action_name().to_string(),
            script_cursor: self.runner.cursor(),
            active_routines: self
                .routines
                .active()
                .iter()
                .map(|id| format!("{:?}", id))
                .collect::<Vec<_>>()
                .join(" "),
            drive_linear: output.drive_linear,
            drive_turn: output.drive_turn,
            pitch: output.pitch,
            winch: output.winch,
            wheel: output.wheel,
            piston_out: output.piston_out,
            pitch_count: self.subs.shooter.pitch_count(),
        };

        self.num_cycles += 1;

        Ok((output, self.report.clone()))
    }

    fn make_safe(&mut self) {
        self.routines.finish_all();
        self.subs.all_neutral();
    }
}

impl Archived for Robot {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(&self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
