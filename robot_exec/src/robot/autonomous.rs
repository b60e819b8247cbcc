//! # Autonomous script execution
//!
//! The script runner turns the command under the script cursor into an
//! [`Action`] and executes it once per control cycle until it reports
//! completion, then moves the cursor on. Only one command is evaluated per
//! cycle.
//!
//! Commands with missing parameters or unknown names complete straight away.
//! The `end` and `invalid` commands halt the script, after which every
//! actuator is commanded to neutral on every cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use util::{
    script_interpreter::{Script, ScriptCommand, END_COMMAND, INVALID_COMMAND},
    time::Timer,
};

use super::routines::{RoutineCtx, RoutineId, RoutineRequest, Routines};
use crate::{
    cmd::{Direction, Subsystem},
    targeting::TargetHeight,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follows a script through the autonomous period.
#[derive(Debug, Default)]
pub struct ScriptRunner {
    script: Option<Script>,

    /// Action decoded from the current command, `None` until the command has
    /// been entered.
    action: Option<Action>,

    /// Timer used by the `wait` command.
    timer: Timer,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One decoded script command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Wait {
        time_s: f64,
    },

    DriveDistance {
        distance: f64,
        speed: f64,
    },

    DriveTime {
        time_s: f64,
        direction: Direction,
        speed: f64,
    },

    /// Turn relative to the heading when the command starts.
    AdjustHeading {
        adjustment_deg: f64,
        speed: f64,
    },

    TurnHeading {
        heading_deg: f64,
        speed: f64,
    },

    TurnTime {
        time_s: f64,
        direction: Direction,
        speed: f64,
    },

    PitchPosition {
        count: f64,
        speed: f64,
    },

    PitchTime {
        time_s: f64,
        direction: Direction,
        speed: f64,
    },

    PitchAngle {
        angle_deg: f64,
        speed: f64,
    },

    /// Run the AutoShoot routine at a power percentage.
    Shoot {
        power: i32,
    },

    RapidFire,

    ClimberPosition {
        count: f64,
        speed: f64,
    },

    ClimberTime {
        time_s: f64,
        direction: Direction,
        speed: f64,
    },

    FindTarget {
        height: TargetHeight,
    },

    /// Completes immediately.
    NoOp,

    /// End of the script.
    Halt,
}

/// Reasons a command cannot be turned into an action.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ActionError {
    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("Command \"{0}\" is missing a required parameter")]
    MissingParam(String),

    #[error("Command \"{0}\" has an invalid direction ({1})")]
    InvalidDirection(String, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Action {
    /// Decode a command, falling back to a no-op if it cannot be executed.
    pub fn from_command(cmd: &ScriptCommand) -> Self {
        match Self::parse(cmd) {
            Ok(a) => a,
            Err(e) => {
                warn!("{}, skipping", e);
                Action::NoOp
            }
        }
    }

    pub fn parse(cmd: &ScriptCommand) -> Result<Self, ActionError> {
        let name = cmd.name.as_str();
        let missing = || ActionError::MissingParam(cmd.name.clone());
        let direction = |value: f64| {
            Direction::from_script(value)
                .ok_or_else(|| ActionError::InvalidDirection(cmd.name.clone(), value))
        };

        let action = match name {
            END_COMMAND | INVALID_COMMAND => Action::Halt,
            "wait" => {
                let [time_s] = cmd.required::<1>().ok_or_else(missing)?;
                Action::Wait { time_s }
            }
            "drivedistance" => {
                let [distance, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::DriveDistance { distance, speed }
            }
            "drivetime" => {
                let [time_s, dir, speed] = cmd.required::<3>().ok_or_else(missing)?;
                Action::DriveTime {
                    time_s,
                    direction: direction(dir)?,
                    speed,
                }
            }
            "adjustheading" => {
                let [adjustment_deg, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::AdjustHeading {
                    adjustment_deg,
                    speed,
                }
            }
            "turnheading" => {
                let [heading_deg, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::TurnHeading { heading_deg, speed }
            }
            "turntime" => {
                let [time_s, dir, speed] = cmd.required::<3>().ok_or_else(missing)?;
                Action::TurnTime {
                    time_s,
                    direction: direction(dir)?,
                    speed,
                }
            }
            "pitchposition" => {
                let [count, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::PitchPosition {
                    count: count.trunc(),
                    speed,
                }
            }
            "pitchtime" => {
                let [time_s, dir, speed] = cmd.required::<3>().ok_or_else(missing)?;
                Action::PitchTime {
                    time_s,
                    direction: direction(dir)?,
                    speed,
                }
            }
            "pitchangle" => {
                let [angle_deg, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::PitchAngle { angle_deg, speed }
            }
            "shoot" => {
                let [power] = cmd.required::<1>().ok_or_else(missing)?;
                Action::Shoot {
                    power: power as i32,
                }
            }
            "rapidfire" => Action::RapidFire,
            "climberposition" => {
                let [count, speed] = cmd.required::<2>().ok_or_else(missing)?;
                Action::ClimberPosition {
                    count: count.trunc(),
                    speed,
                }
            }
            "climbertime" => {
                let [time_s, dir, speed] = cmd.required::<3>().ok_or_else(missing)?;
                Action::ClimberTime {
                    time_s,
                    direction: direction(dir)?,
                    speed,
                }
            }
            "findtarget" => {
                let [height] = cmd.required::<1>().ok_or_else(missing)?;
                Action::FindTarget {
                    height: TargetHeight::from_script(height),
                }
            }
            _ => return Err(ActionError::UnknownCommand(cmd.name.clone())),
        };

        Ok(action)
    }

    /// Subsystems commanded directly by the action.
    ///
    /// Actions which run a routine claim nothing themselves, the routine's
    /// own claims apply.
    pub fn claims(&self) -> &'static [Subsystem] {
        match self {
            Action::DriveDistance { .. }
            | Action::DriveTime { .. }
            | Action::AdjustHeading { .. }
            | Action::TurnHeading { .. }
            | Action::TurnTime { .. } => &[Subsystem::Drive],
            Action::PitchPosition { .. } | Action::PitchTime { .. } | Action::PitchAngle { .. } => {
                &[Subsystem::Pitch]
            }
            Action::ClimberPosition { .. } | Action::ClimberTime { .. } => &[Subsystem::Winch],
            _ => &[],
        }
    }

    /// The routine the action runs, if any.
    pub fn routine(&self) -> Option<RoutineRequest> {
        match *self {
            Action::Shoot { power } => Some(RoutineRequest::AutoShoot(power)),
            Action::RapidFire => Some(RoutineRequest::RapidFire),
            Action::FindTarget { height } => Some(RoutineRequest::FindTarget(height)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Wait { .. } => "wait",
            Action::DriveDistance { .. } => "drivedistance",
            Action::DriveTime { .. } => "drivetime",
            Action::AdjustHeading { .. } => "adjustheading",
            Action::TurnHeading { .. } => "turnheading",
            Action::TurnTime { .. } => "turntime",
            Action::PitchPosition { .. } => "pitchposition",
            Action::PitchTime { .. } => "pitchtime",
            Action::PitchAngle { .. } => "pitchangle",
            Action::Shoot { .. } => "shoot",
            Action::RapidFire => "rapidfire",
            Action::ClimberPosition { .. } => "climberposition",
            Action::ClimberTime { .. } => "climbertime",
            Action::FindTarget { .. } => "findtarget",
            Action::NoOp => "noop",
            Action::Halt => "halt",
        }
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start following a script from its first command.
    pub fn load(&mut self, mut script: Script) {
        script.rewind();

        info!(
            "Script {:?} loaded with {} commands",
            script.path(),
            script.num_cmds()
        );

        self.script = Some(script);
        self.action = None;
    }

    /// Drop the script, the runner halts on its next step.
    pub fn unload(&mut self) {
        self.script = None;
        self.action = None;
    }

    /// Index of the current command, if a script is loaded.
    pub fn cursor(&self) -> Option<usize> {
        self.script.as_ref().map(|s| s.cursor())
    }

    /// Name of the action being executed.
    pub fn action_name(&self) -> &'static str {
        self.action.map_or("none", |a| a.name())
    }

    pub fn is_halted(&self) -> bool {
        self.action == Some(Action::Halt)
    }

    /// Execute the current command for one cycle.
    ///
    /// Active routines are stepped as part of this, and every subsystem
    /// neither the command nor a routine is commanding is set to neutral.
    pub fn step(&mut self, ctx: &mut RoutineCtx, routines: &mut Routines) {
        let action = match self.action {
            Some(a) => a,
            None => {
                let action = match self.script {
                    Some(ref s) => Action::from_command(s.current()),
                    None => Action::Halt,
                };
                self.enter(action, ctx, routines);
                self.action = Some(action);
                action
            }
        };

        if action == Action::Halt {
            routines.finish_all();
            ctx.subs.all_neutral();
            return;
        }

        routines.step(ctx);
        let complete = self.execute(action, ctx, routines);

        for sub in Subsystem::ALL.iter() {
            if !action.claims().contains(sub) && !routines.claimed(*sub) {
                ctx.subs.neutral(*sub);
            }
        }

        if complete {
            self.action = None;

            if let Some(ref mut script) = self.script {
                let next = script.advance();
                debug!("Command {} complete, next is \"{}\"", action.name(), next.name);
            }
        }
    }

    // ---- PRIVATE ----

    /// Entry actions of a command, run on the first cycle it executes.
    fn enter(&mut self, action: Action, ctx: &mut RoutineCtx, routines: &mut Routines) {
        let subs = &mut *ctx.subs;

        match action {
            Action::Wait { .. } => self.timer.reset(ctx.now_s),
            Action::DriveDistance { .. } => subs.drive_train.reset_sensors(),
            Action::DriveTime { .. } | Action::TurnTime { .. } => subs.drive_train.reset_timer(),
            Action::PitchTime { .. } => subs.shooter.reset_timer(),
            Action::ClimberTime { .. } => subs.climber.reset_timer(),
            Action::Halt => info!("Script halted, all actuators neutral"),
            _ => (),
        }

        if let Some(request) = action.routine() {
            routines.start(request, ctx.params, subs);
        }

        debug!("Executing {:?}", action);
    }

    /// Returns true once the action is complete.
    fn execute(&mut self, action: Action, ctx: &mut RoutineCtx, routines: &Routines) -> bool {
        let subs = &mut *ctx.subs;

        match action {
            Action::Wait { time_s } => {
                if self.timer.elapsed(ctx.now_s) >= time_s {
                    self.timer.stop(ctx.now_s);
                    true
                } else {
                    false
                }
            }
            Action::DriveDistance { distance, speed } => {
                subs.drive_train.drive_distance(distance, speed)
            }
            Action::DriveTime {
                time_s,
                direction,
                speed,
            } => subs.drive_train.drive_time(time_s, direction, speed),
            Action::AdjustHeading {
                adjustment_deg,
                speed,
            } => subs.drive_train.adjust_heading(adjustment_deg, speed),
            Action::TurnHeading { heading_deg, speed } => {
                subs.drive_train.turn_heading(heading_deg, speed)
            }
            Action::TurnTime {
                time_s,
                direction,
                speed,
            } => subs.drive_train.turn_time(time_s, direction, speed),
            Action::PitchPosition { count, speed } => subs.shooter.set_pitch(count, speed),
            Action::PitchTime {
                time_s,
                direction,
                speed,
            } => subs.shooter.set_pitch_time(time_s, direction, speed),
            Action::PitchAngle { angle_deg, speed } => subs.shooter.set_pitch_angle(angle_deg, speed),
            Action::ClimberPosition { count, speed } => subs.climber.set_position(count, speed),
            Action::ClimberTime {
                time_s,
                direction,
                speed,
            } => subs.climber.set_time(time_s, direction, speed),
            Action::Shoot { .. } => !routines.is_active(RoutineId::AutoShoot),
            Action::RapidFire => !routines.is_active(RoutineId::RapidFire),
            Action::FindTarget { .. } => !routines.is_active(RoutineId::FindTarget),
            Action::NoOp => true,
            Action::Halt => false,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        cmd::RobotMode,
        robot::{routines::TargetContext, test::sim_subsystems, Params, Subsystems},
        targeting::Params as TargetingParams,
    };

    struct Fixture {
        subs: Subsystems,
        targets: TargetContext,
        params: Params,
        routines: Routines,
        runner: ScriptRunner,
    }

    impl Fixture {
        fn new(script: &str) -> (eqpt_if::sim::SimEqpt, Self) {
            let (sim, mut subs) = sim_subsystems();
            subs.set_robot_state(RobotMode::Autonomous);

            let mut runner = ScriptRunner::new();
            runner.load(Script::parse(script));

            (
                sim,
                Self {
                    subs,
                    targets: TargetContext::new(TargetingParams::default()),
                    params: Params::default(),
                    routines: Routines::new(),
                    runner,
                },
            )
        }

        fn tick(&mut self, now_s: f64) {
            self.subs.read_sensors(now_s);

            let mut ctx = RoutineCtx {
                subs: &mut self.subs,
                targets: &mut self.targets,
                params: &self.params,
                latest: None,
                now_s,
            };
            self.runner.step(&mut ctx, &mut self.routines);
        }
    }

    #[test]
    fn test_parse_commands() {
        let mut script = Script::parse(
            "wait 2\n\
             DriveTime 1.5 3 0.8\n\
             pitchposition 120.7 0.5\n\
             findtarget 2\n\
             drivetime 1 9 0.5\n\
             shoot\n\
             spin 1\n\
             end",
        );

        let mut actions = vec![Action::parse(script.current())];
        while !script.current().is_terminal() {
            actions.push(Action::parse(script.advance()));
        }

        assert_eq!(
            actions,
            vec![
                Ok(Action::Wait { time_s: 2.0 }),
                Ok(Action::DriveTime {
                    time_s: 1.5,
                    direction: Direction::Backward,
                    speed: 0.8
                }),
                Ok(Action::PitchPosition {
                    count: 120.0,
                    speed: 0.5
                }),
                Ok(Action::FindTarget {
                    height: TargetHeight::High
                }),
                Err(ActionError::InvalidDirection("drivetime".into(), 9.0)),
                Err(ActionError::MissingParam("shoot".into())),
                Err(ActionError::UnknownCommand("spin".into())),
                Ok(Action::Halt),
            ]
        );
    }

    #[test]
    fn test_wait_then_drive() {
        let (sim, mut fx) = Fixture::new("wait 2\ndrivedistance 5 0.5\nend");

        fx.tick(0.0);
        assert_eq!(fx.runner.cursor(), Some(0));
        fx.tick(1.0);
        fx.tick(1.99);
        assert_eq!(fx.runner.cursor(), Some(0));
        assert_eq!(fx.subs.drive_train.demand().linear, 0.0);

        fx.tick(2.0);
        assert_eq!(fx.runner.cursor(), Some(1));

        // The drive starts on the next cycle
        fx.tick(2.02);
        assert_eq!(fx.runner.cursor(), Some(1));
        assert_eq!(fx.runner.action_name(), "drivedistance");
        assert_eq!(fx.subs.drive_train.demand().linear, 0.5);
        assert_eq!(sim.motor_at(1).unwrap().demand(), 0.5);
        assert_eq!(sim.motor_at(2).unwrap().demand(), 0.5);
    }

    #[test]
    fn test_bad_commands_skipped() {
        let (_sim, mut fx) = Fixture::new("dance 1 2\nwait\ndrivetime 1 7 1.0\nwait 1\nend");

        fx.tick(0.0);
        assert_eq!(fx.runner.cursor(), Some(1));
        fx.tick(0.02);
        assert_eq!(fx.runner.cursor(), Some(2));
        fx.tick(0.04);
        assert_eq!(fx.runner.cursor(), Some(3));
        assert!(!fx.runner.is_halted());
    }

    #[test]
    fn test_halt_is_neutral() {
        let (sim, mut fx) = Fixture::new("end");

        fx.subs.drive_train.drive(0.7, 0.2, false);
        fx.subs.climber.move_winch(0.5, false);
        fx.subs.shooter.shoot(100);
        fx.routines.start(RoutineRequest::ClimbingPrep, &fx.params, &mut fx.subs);

        fx.tick(0.0);

        assert!(fx.runner.is_halted());
        assert!(fx.routines.active().is_empty());
        assert_eq!(sim.motor_at(1).unwrap().demand(), 0.0);
        assert_eq!(sim.motor_at(5).unwrap().demand(), 0.0);
        assert_eq!(fx.subs.shooter.wheel_demand(), 0.0);

        // Stays halted on later cycles
        fx.tick(0.02);
        assert!(fx.runner.is_halted());
        assert_eq!(fx.runner.cursor(), Some(0));
    }

    #[test]
    fn test_no_script_halts() {
        let (_sim, mut fx) = Fixture::new("wait 1");
        fx.runner.unload();

        fx.tick(0.0);
        assert!(fx.runner.is_halted());
        assert_eq!(fx.runner.cursor(), None);
    }

    #[test]
    fn test_shoot_runs_routine() {
        let (sim, mut fx) = Fixture::new("shoot 100\nend");
        let piston = sim.solenoid_at(1).unwrap();

        fx.tick(0.0);
        assert!(fx.routines.is_active(RoutineId::AutoShoot));
        assert!(fx.subs.shooter.wheel_demand() > 0.0);
        assert!(!piston.is_on());

        fx.tick(1.6);
        assert!(piston.is_on());
        assert_eq!(fx.runner.cursor(), Some(0));

        fx.tick(2.2);
        assert!(!piston.is_on());
        assert!(!fx.routines.is_active(RoutineId::AutoShoot));
        assert_eq!(fx.subs.shooter.wheel_demand(), 0.0);
        assert_eq!(fx.runner.cursor(), Some(1));
    }
}
