//! # Semi-autonomous routines
//!
//! Each routine is a small step machine advanced once per control cycle. A
//! step either moves straight on to the next step within the same cycle or
//! suspends until the next one, so a routine never blocks the loop.
//!
//! Routines claim the subsystems they command. Starting a routine finishes
//! every other routine sharing one of its claims and sets that routine's
//! subsystems to neutral, so at most one routine commands a subsystem in any
//! cycle. A routine commands every subsystem it claims on each step, holding
//! the ones it is not moving at neutral.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod aim;
mod climb;
mod pitch_preset;
mod shoot;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fmt::Debug, sync::Arc};

use log::{info, warn};
use serde::Serialize;

pub use aim::{Aim, CycleTarget, FindTarget, TargetContext};
pub use climb::AutoClimb;
pub use pitch_preset::PitchPreset;
pub use shoot::Shoot;

use super::{Params, Subsystems};
use crate::{
    cmd::Subsystem,
    targeting::{TargetHeight, TargetSnapshot},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most steps a single routine may take in one cycle before it is forced to
/// suspend.
pub const MAX_STEPS_PER_CYCLE: usize = 16;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything a routine may touch while stepping.
pub struct RoutineCtx<'a> {
    pub subs: &'a mut Subsystems,

    /// Targets captured for aiming.
    pub targets: &'a mut TargetContext,

    pub params: &'a Params,

    /// Snapshot copied out of the targeting worker at the start of the cycle.
    pub latest: Option<Arc<TargetSnapshot>>,

    /// Tick time of the cycle.
    ///
    /// Units: seconds
    pub now_s: f64,
}

/// The set of routines available to the operators and scripts.
#[derive(Debug, Default)]
pub struct Routines {
    auto_shoot: Shoot,
    rapid_fire: Shoot,
    find_target: FindTarget,
    cycle_target: CycleTarget,
    aim: Aim,
    feeder_height: PitchPreset,
    climbing_prep: PitchPreset,
    auto_climb: AutoClimb,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Cursor of a routine's step machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutineState<S> {
    Step(S),
    Finished,
}

/// Result of evaluating one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow<S> {
    /// Continue with the given step in this cycle.
    Next(S),

    /// Suspend until the next cycle, resuming at the given step.
    Wait(S),

    /// The routine is complete.
    Done,
}

/// Names of the routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoutineId {
    AutoShoot,
    RapidFire,
    FindTarget,
    CycleTarget,
    Aim,
    FeederHeight,
    ClimbingPrep,
    AutoClimb,
}

/// A request to start a routine, with its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutineRequest {
    /// Shoot one disc at the given power percentage.
    AutoShoot(i32),
    RapidFire,
    FindTarget(TargetHeight),
    CycleTarget,
    Aim,
    FeederHeight,
    ClimbingPrep,
    AutoClimb,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S> Default for RoutineState<S> {
    fn default() -> Self {
        RoutineState::Finished
    }
}

impl<S> RoutineState<S> {
    pub fn is_active(&self) -> bool {
        !matches!(self, RoutineState::Finished)
    }
}

impl RoutineId {
    /// Every routine, in the order they are stepped.
    pub const ALL: [RoutineId; 8] = [
        RoutineId::AutoShoot,
        RoutineId::RapidFire,
        RoutineId::FindTarget,
        RoutineId::CycleTarget,
        RoutineId::Aim,
        RoutineId::FeederHeight,
        RoutineId::ClimbingPrep,
        RoutineId::AutoClimb,
    ];

    /// The subsystems the routine commands.
    pub fn claims(self) -> &'static [Subsystem] {
        match self {
            RoutineId::AutoShoot | RoutineId::RapidFire => {
                &[Subsystem::ShooterWheel, Subsystem::Feeder]
            }
            RoutineId::FindTarget | RoutineId::CycleTarget | RoutineId::Aim => {
                &[Subsystem::Drive, Subsystem::Pitch]
            }
            RoutineId::FeederHeight | RoutineId::ClimbingPrep => &[Subsystem::Pitch],
            RoutineId::AutoClimb => &[Subsystem::Drive, Subsystem::Pitch, Subsystem::Winch],
        }
    }

    pub fn claims_any(self, subs: &[Subsystem]) -> bool {
        self.claims().iter().any(|s| subs.contains(s))
    }
}

impl RoutineRequest {
    pub fn id(&self) -> RoutineId {
        match self {
            RoutineRequest::AutoShoot(_) => RoutineId::AutoShoot,
            RoutineRequest::RapidFire => RoutineId::RapidFire,
            RoutineRequest::FindTarget(_) => RoutineId::FindTarget,
            RoutineRequest::CycleTarget => RoutineId::CycleTarget,
            RoutineRequest::Aim => RoutineId::Aim,
            RoutineRequest::FeederHeight => RoutineId::FeederHeight,
            RoutineRequest::ClimbingPrep => RoutineId::ClimbingPrep,
            RoutineRequest::AutoClimb => RoutineId::AutoClimb,
        }
    }
}

impl Routines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a routine from its first step.
    ///
    /// Any active routine sharing a subsystem with the new one, including a
    /// previous run of the same routine, is finished first and every
    /// subsystem it claimed is commanded to neutral.
    pub fn start(&mut self, request: RoutineRequest, params: &Params, subs: &mut Subsystems) {
        let id = request.id();

        for other in RoutineId::ALL.iter() {
            if self.is_active(*other) && other.claims_any(id.claims()) {
                info!("{:?} pre-empted by {:?}", other, id);
                self.finish(*other);

                for sub in other.claims() {
                    subs.neutral(*sub);
                }
            }
        }

        match request {
            RoutineRequest::AutoShoot(power) => self.auto_shoot.start(power, 1),
            RoutineRequest::RapidFire => self
                .rapid_fire
                .start(params.rapid_fire_power, params.rapid_fire_discs),
            RoutineRequest::FindTarget(height) => self.find_target.start(height),
            RoutineRequest::CycleTarget => self.cycle_target.start(),
            RoutineRequest::Aim => self.aim.start(),
            RoutineRequest::FeederHeight => {
                self.feeder_height.start(params.auto_feeder_height_angle_deg)
            }
            RoutineRequest::ClimbingPrep => {
                self.climbing_prep.start(params.auto_climbing_angle_deg)
            }
            RoutineRequest::AutoClimb => self.auto_climb.start(),
        }

        info!("{:?} started", id);
    }

    /// Finish a routine without commanding anything.
    ///
    /// The caller is responsible for commanding the released subsystems in
    /// the same cycle.
    pub fn finish(&mut self, id: RoutineId) {
        match id {
            RoutineId::AutoShoot => self.auto_shoot.finish(),
            RoutineId::RapidFire => self.rapid_fire.finish(),
            RoutineId::FindTarget => self.find_target.finish(),
            RoutineId::CycleTarget => self.cycle_target.finish(),
            RoutineId::Aim => self.aim.finish(),
            RoutineId::FeederHeight => self.feeder_height.finish(),
            RoutineId::ClimbingPrep => self.climbing_prep.finish(),
            RoutineId::AutoClimb => self.auto_climb.finish(),
        }
    }

    pub fn finish_all(&mut self) {
        for id in RoutineId::ALL.iter() {
            self.finish(*id);
        }
    }

    /// Finish every active routine commanding the subsystem.
    pub fn finish_claiming(&mut self, sub: Subsystem) {
        for id in RoutineId::ALL.iter() {
            if self.is_active(*id) && id.claims().contains(&sub) {
                info!("{:?} aborted by manual {:?} control", id, sub);
                self.finish(*id);
            }
        }
    }

    pub fn is_active(&self, id: RoutineId) -> bool {
        match id {
            RoutineId::AutoShoot => self.auto_shoot.is_active(),
            RoutineId::RapidFire => self.rapid_fire.is_active(),
            RoutineId::FindTarget => self.find_target.is_active(),
            RoutineId::CycleTarget => self.cycle_target.is_active(),
            RoutineId::Aim => self.aim.is_active(),
            RoutineId::FeederHeight => self.feeder_height.is_active(),
            RoutineId::ClimbingPrep => self.climbing_prep.is_active(),
            RoutineId::AutoClimb => self.auto_climb.is_active(),
        }
    }

    /// The routines which are currently running.
    pub fn active(&self) -> Vec<RoutineId> {
        RoutineId::ALL
            .iter()
            .copied()
            .filter(|id| self.is_active(*id))
            .collect()
    }

    /// Returns true if an active routine commands the subsystem.
    pub fn claimed(&self, sub: Subsystem) -> bool {
        self.active().iter().any(|id| id.claims().contains(&sub))
    }

    /// Advance every active routine by one cycle.
    pub fn step(&mut self, ctx: &mut RoutineCtx) {
        for id in RoutineId::ALL.iter() {
            if !self.is_active(*id) {
                continue;
            }

            let done = match id {
                RoutineId::AutoShoot => self.auto_shoot.step(ctx),
                RoutineId::RapidFire => self.rapid_fire.step(ctx),
                RoutineId::FindTarget => self.find_target.step(ctx),
                RoutineId::CycleTarget => self.cycle_target.step(ctx),
                RoutineId::Aim => self.aim.step(ctx),
                RoutineId::FeederHeight => self.feeder_height.step(ctx),
                RoutineId::ClimbingPrep => self.climbing_prep.step(ctx),
                RoutineId::AutoClimb => self.auto_climb.step(ctx),
            };

            if done {
                info!("{:?} finished", id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Advance a step machine for one cycle, following `Flow::Next` transitions
/// within the cycle.
///
/// Returns true once the machine is finished. A machine still chaining steps
/// after [`MAX_STEPS_PER_CYCLE`] is suspended where it is.
pub fn run_steps<S, F>(state: &mut RoutineState<S>, mut step: F) -> bool
where
    S: Copy + Debug,
    F: FnMut(S) -> Flow<S>,
{
    for _ in 0..MAX_STEPS_PER_CYCLE {
        let current = match *state {
            RoutineState::Step(s) => s,
            RoutineState::Finished => return true,
        };

        match step(current) {
            Flow::Next(s) => *state = RoutineState::Step(s),
            Flow::Wait(s) => {
                *state = RoutineState::Step(s);
                return false;
            }
            Flow::Done => {
                *state = RoutineState::Finished;
                return true;
            }
        }
    }

    warn!(
        "Step machine still running after {} steps, suspended at {:?}",
        MAX_STEPS_PER_CYCLE, state
    );
    false
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{robot::test::sim_subsystems, targeting::Params as TargetingParams};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Count {
        Up(u32),
    }

    #[test]
    fn test_run_steps_falls_through() {
        let mut state = RoutineState::Step(Count::Up(0));

        // Steps chain until one waits
        let done = run_steps(&mut state, |s| match s {
            Count::Up(n) if n < 3 => Flow::Next(Count::Up(n + 1)),
            Count::Up(n) => Flow::Wait(Count::Up(n)),
        });
        assert!(!done);
        assert_eq!(state, RoutineState::Step(Count::Up(3)));

        let done = run_steps(&mut state, |_| Flow::Done);
        assert!(done);
        assert_eq!(state, RoutineState::Finished);

        // A finished machine is never stepped again
        assert!(run_steps(&mut state, |_| panic!("stepped a finished machine")));
    }

    #[test]
    fn test_run_steps_guard() {
        let mut state = RoutineState::Step(Count::Up(0));
        let mut calls = 0;

        let done = run_steps(&mut state, |Count::Up(n)| {
            calls += 1;
            Flow::Next(Count::Up(n + 1))
        });

        assert!(!done);
        assert_eq!(calls, MAX_STEPS_PER_CYCLE);
        assert_eq!(state, RoutineState::Step(Count::Up(MAX_STEPS_PER_CYCLE as u32)));
    }

    #[test]
    fn test_start_pre_empts_conflicting() {
        let params = Params::default();
        let (_sim, mut subs) = sim_subsystems();
        let mut routines = Routines::new();

        routines.start(RoutineRequest::FindTarget(TargetHeight::High), &params, &mut subs);
        routines.start(RoutineRequest::AutoShoot(100), &params, &mut subs);
        assert_eq!(
            routines.active(),
            vec![RoutineId::AutoShoot, RoutineId::FindTarget]
        );

        // Pitch is shared with FindTarget, the wheel is not
        routines.start(RoutineRequest::FeederHeight, &params, &mut subs);
        assert_eq!(
            routines.active(),
            vec![RoutineId::AutoShoot, RoutineId::FeederHeight]
        );

        // AutoClimb takes the drive and pitch
        routines.start(RoutineRequest::AutoClimb, &params, &mut subs);
        assert_eq!(
            routines.active(),
            vec![RoutineId::AutoShoot, RoutineId::AutoClimb]
        );
        assert!(routines.claimed(Subsystem::Winch));
        assert!(routines.claimed(Subsystem::Feeder));
    }

    #[test]
    fn test_pre_empted_subsystems_neutral() {
        let params = Params::default();
        let (sim, mut subs) = sim_subsystems();
        let mut targets = TargetContext::new(TargetingParams::default());
        let mut routines = Routines::new();

        routines.start(RoutineRequest::FeederHeight, &params, &mut subs);
        routines.step(&mut RoutineCtx {
            subs: &mut subs,
            targets: &mut targets,
            params: &params,
            latest: None,
            now_s: 0.0,
        });
        assert!(sim.motor_at(4).unwrap().demand() > 0.0);

        // FindTarget takes the pitch but does not move it until aiming
        routines.start(RoutineRequest::FindTarget(TargetHeight::High), &params, &mut subs);
        assert_eq!(routines.active(), vec![RoutineId::FindTarget]);
        assert_eq!(sim.motor_at(4).unwrap().demand(), 0.0);

        routines.step(&mut RoutineCtx {
            subs: &mut subs,
            targets: &mut targets,
            params: &params,
            latest: None,
            now_s: 0.02,
        });
        assert_eq!(sim.motor_at(4).unwrap().demand(), 0.0);
        assert_eq!(subs.drive_train.demand().turn, 0.0);
    }

    #[test]
    fn test_claims_exclusive() {
        let params = Params::default();
        let (_sim, mut subs) = sim_subsystems();
        let requests = [
            RoutineRequest::AutoShoot(50),
            RoutineRequest::RapidFire,
            RoutineRequest::FindTarget(TargetHeight::Low),
            RoutineRequest::CycleTarget,
            RoutineRequest::Aim,
            RoutineRequest::FeederHeight,
            RoutineRequest::ClimbingPrep,
            RoutineRequest::AutoClimb,
        ];

        // Whatever order routines are started in, no subsystem is ever
        // claimed by two of them
        for first in requests.iter() {
            for second in requests.iter() {
                let mut routines = Routines::new();
                routines.start(*first, &params, &mut subs);
                routines.start(*second, &params, &mut subs);

                for sub in Subsystem::ALL.iter() {
                    let claimants = routines
                        .active()
                        .iter()
                        .filter(|id| id.claims().contains(sub))
                        .count();
                    assert!(claimants <= 1, "{:?} then {:?} claims {:?}", first, second, sub);
                }
            }
        }
    }

    #[test]
    fn test_finish_claiming() {
        let params = Params::default();
        let (_sim, mut subs) = sim_subsystems();
        let mut routines = Routines::new();

        routines.start(RoutineRequest::RapidFire, &params, &mut subs);
        routines.start(RoutineRequest::Aim, &params, &mut subs);

        routines.finish_claiming(Subsystem::Drive);
        assert_eq!(routines.active(), vec![RoutineId::RapidFire]);

        routines.finish_claiming(Subsystem::Winch);
        assert_eq!(routines.active(), vec![RoutineId::RapidFire]);

        routines.finish_all();
        assert!(routines.active().is_empty());
    }
}
