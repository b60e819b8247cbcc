//! # Operator control
//!
//! Each cycle the scoring controller's button edges may start routines, then
//! manual input is arbitrated against the running routines. Manual input on
//! a subsystem finishes every routine commanding it before anything is
//! stepped, so within one cycle a subsystem is commanded either by the
//! operator, by exactly one routine, or set to neutral.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::input::{Axis, Button};
use log::trace;

use super::{
    input::ControllerEdges,
    routines::{RoutineCtx, RoutineRequest, Routines},
    Params,
};
use crate::{cmd::Subsystem, targeting::TargetHeight};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Flywheel power while the operator holds the shoot trigger.
///
/// Units: percent
pub const MANUAL_SHOOT_POWER: i32 = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manual commands read from both controllers in one cycle.
///
/// A `None` axis command means the stick is centred.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualInput {
    /// Linear and turn demands.
    pub drive: Option<(f64, f64)>,

    pub driver_turbo: bool,

    pub pitch: Option<f64>,

    pub winch: Option<f64>,

    pub scoring_turbo: bool,

    /// Shoot trigger held.
    pub shoot: bool,

    /// Feed a disc.
    pub fire: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ManualInput {
    pub fn from_controllers(driver: &ControllerEdges, scoring: &ControllerEdges) -> Self {
        let linear = driver.axis(Axis::LeftY);
        let turn = driver.axis(Axis::RightX);

        let drive = if linear != 0.0 || turn != 0.0 {
            Some((linear, turn))
        } else {
            None
        };

        let shoot = scoring.held(Button::LeftTrigger);

        // The piston fires on the d-pad edge, only while the wheel is spinning
        let fire =
            shoot && scoring.axis(Axis::DpadY) != 0.0 && scoring.axis_changed(Axis::DpadY);

        Self {
            drive,
            driver_turbo: driver.held(Button::RightBumper),
            pitch: non_zero(scoring.axis(Axis::LeftY)),
            winch: non_zero(scoring.axis(Axis::RightY)),
            scoring_turbo: scoring.held(Button::RightBumper),
            shoot,
            fire,
        }
    }

    /// Returns true if the operator is commanding the subsystem.
    pub fn commands(&self, sub: Subsystem) -> bool {
        match sub {
            Subsystem::Drive => self.drive.is_some(),
            Subsystem::Pitch => self.pitch.is_some(),
            Subsystem::Winch => self.winch.is_some(),
            Subsystem::ShooterWheel => self.shoot,
            Subsystem::Feeder => self.fire,
        }
    }

    /// The subsystems under manual control.
    pub fn subsystems(&self) -> Vec<Subsystem> {
        Subsystem::ALL
            .iter()
            .copied()
            .filter(|s| self.commands(*s))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Routines requested by button presses on the scoring controller.
pub fn requests(scoring: &ControllerEdges, params: &Params) -> Vec<RoutineRequest> {
    let mapping = [
        (Button::RightTrigger, RoutineRequest::AutoShoot(params.auto_shoot_power)),
        (Button::X, RoutineRequest::RapidFire),
        (Button::B, RoutineRequest::FindTarget(TargetHeight::High)),
        (Button::Y, RoutineRequest::CycleTarget),
        (Button::LeftBumper, RoutineRequest::Aim),
        (Button::A, RoutineRequest::FeederHeight),
        (Button::Start, RoutineRequest::ClimbingPrep),
        (Button::Back, RoutineRequest::AutoClimb),
    ];

    mapping
        .iter()
        .filter(|(b, _)| scoring.pressed(*b))
        .map(|(_, r)| *r)
        .collect()
}

/// Run one operator control cycle.
pub fn step(
    ctx: &mut RoutineCtx,
    routines: &mut Routines,
    driver: &ControllerEdges,
    scoring: &ControllerEdges,
) {
    for request in requests(scoring, ctx.params) {
        routines.start(request, ctx.params, ctx.subs);
    }

    let manual = ManualInput::from_controllers(driver, scoring);
    trace!("Manual input: {:?}", manual);

    for sub in manual.subsystems() {
        routines.finish_claiming(sub);
    }

    routines.step(ctx);

    let subs = &mut *ctx.subs;

    for sub in Subsystem::ALL.iter() {
        match sub {
            Subsystem::Drive => match manual.drive {
                Some((linear, turn)) => subs.drive_train.drive(linear, turn, manual.driver_turbo),
                None if !routines.claimed(*sub) => subs.neutral(*sub),
                None => (),
            },
            Subsystem::Pitch => match manual.pitch {
                Some(speed) => subs.shooter.move_pitch(speed, manual.scoring_turbo),
                None if !routines.claimed(*sub) => subs.neutral(*sub),
                None => (),
            },
            Subsystem::Winch => match manual.winch {
                Some(speed) => subs.climber.move_winch(speed, manual.scoring_turbo),
                None if !routines.claimed(*sub) => subs.neutral(*sub),
                None => (),
            },
            Subsystem::ShooterWheel => {
                if manual.shoot {
                    subs.shooter.shoot(MANUAL_SHOOT_POWER);
                } else if !routines.claimed(*sub) {
                    subs.neutral(*sub);
                }
            }
            Subsystem::Feeder => {
                if manual.fire {
                    subs.feeder.set_piston(true);
                } else if !routines.claimed(*sub) {
                    subs.neutral(*sub);
                }
            }
        }
    }
}

fn non_zero(value: f64) -> Option<f64> {
    if value != 0.0 {
        Some(value)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::input::GamepadState;

    fn edges(states: &[GamepadState]) -> ControllerEdges {
        let mut edges = ControllerEdges::default();
        for s in states {
            edges.update(*s);
        }
        edges
    }

    #[test]
    fn test_manual_input() {
        let idle = GamepadState::default();
        let driver = edges(&[idle
            .with_axis(Axis::RightX, -0.3)
            .with_button(Button::RightBumper)]);
        let scoring = edges(&[idle.with_axis(Axis::RightY, 0.5)]);

        let manual = ManualInput::from_controllers(&driver, &scoring);

        assert_eq!(manual.drive, Some((0.0, -0.3)));
        assert!(manual.driver_turbo);
        assert_eq!(manual.pitch, None);
        assert_eq!(manual.winch, Some(0.5));
        assert!(!manual.shoot);
        assert_eq!(manual.subsystems(), vec![Subsystem::Drive, Subsystem::Winch]);
    }

    #[test]
    fn test_fire_needs_trigger_and_edge() {
        let idle = GamepadState::default();
        let trigger = idle.with_button(Button::LeftTrigger);
        let dpad = trigger.with_axis(Axis::DpadY, 1.0);

        // D-pad without the trigger
        let scoring = edges(&[idle, idle.with_axis(Axis::DpadY, 1.0)]);
        assert!(!ManualInput::from_controllers(&edges(&[]), &scoring).fire);

        let scoring = edges(&[trigger, dpad]);
        let manual = ManualInput::from_controllers(&edges(&[]), &scoring);
        assert!(manual.shoot);
        assert!(manual.fire);

        // Holding the d-pad does not fire again
        let scoring = edges(&[trigger, dpad, dpad]);
        let manual = ManualInput::from_controllers(&edges(&[]), &scoring);
        assert!(manual.shoot);
        assert!(!manual.fire);
    }

    #[test]
    fn test_requests_on_press_only() {
        let params = Params::default();
        let idle = GamepadState::default();
        let pressed = idle.with_button(Button::B).with_button(Button::Back);

        let scoring = edges(&[idle, pressed]);
        assert_eq!(
            requests(&scoring, &params),
            vec![
                RoutineRequest::FindTarget(TargetHeight::High),
                RoutineRequest::AutoClimb
            ]
        );

        let scoring = edges(&[pressed, pressed]);
        assert!(requests(&scoring, &params).is_empty());

        let scoring = edges(&[idle.with_button(Button::RightTrigger)]);
        assert_eq!(
            requests(&scoring, &params),
            vec![RoutineRequest::AutoShoot(params.auto_shoot_power)]
        );
    }
}
