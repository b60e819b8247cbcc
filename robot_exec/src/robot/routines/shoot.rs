//! Automatic shooting of one or more discs

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use util::time::Timer;

use super::{run_steps, Flow, RoutineCtx, RoutineState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Spin the flywheel up, then feed discs into it one at a time.
///
/// The flywheel is commanded on every cycle the routine runs.
#[derive(Debug, Default)]
pub struct Shoot {
    state: RoutineState<ShootStep>,

    /// Units: percent
    power: i32,

    discs: u32,

    fired: u32,

    timer: Timer,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum ShootStep {
    /// Start timing the spin up.
    Start,

    /// Wait for the flywheel to reach speed.
    SpinUp,

    /// Push a disc into the flywheel.
    Feed,

    /// Hold the piston out while the disc leaves.
    SpinDown,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Shoot {
    pub fn start(&mut self, power: i32, discs: u32) {
        self.state = RoutineState::Step(ShootStep::Start);
        self.power = power;
        self.discs = discs.max(1);
        self.fired = 0;
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Returns true once the last disc has been fired.
    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        if !ctx.subs.feeder.is_enabled() || !ctx.subs.shooter.wheel_enabled() {
            warn!("Cannot shoot without both the feeder and the flywheel");
            self.finish();
            return true;
        }

        ctx.subs.shooter.shoot(self.power);

        let mut state = self.state;
        let done = run_steps(&mut state, |step| self.advance(step, ctx));
        self.state = state;

        done
    }

    fn advance(&mut self, step: ShootStep, ctx: &mut RoutineCtx) -> Flow<ShootStep> {
        let elapsed = self.timer.elapsed(ctx.now_s);

        match step {
            ShootStep::Start => {
                self.timer.reset(ctx.now_s);
                Flow::Next(ShootStep::SpinUp)
            }
            ShootStep::SpinUp => {
                if ctx.params.auto_shooter_spinup_time_s - elapsed <= 0.0 {
                    Flow::Next(ShootStep::Feed)
                } else {
                    Flow::Wait(ShootStep::SpinUp)
                }
            }
            ShootStep::Feed => {
                ctx.subs.feeder.set_piston(true);
                self.timer.reset(ctx.now_s);
                self.fired += 1;
                debug!("Feeding disc {} of {}", self.fired, self.discs);
                Flow::Next(ShootStep::SpinDown)
            }
            ShootStep::SpinDown => {
                if ctx.params.auto_shooter_spindown_time_s - elapsed > 0.0 {
                    return Flow::Wait(ShootStep::SpinDown);
                }

                ctx.subs.feeder.set_piston(false);

                if self.fired < self.discs {
                    // The piston needs a cycle retracted before the next feed
                    Flow::Wait(ShootStep::Feed)
                } else {
                    self.timer.stop(ctx.now_s);
                    ctx.subs.shooter.shoot(0);
                    Flow::Done
                }
            }
        }
    }
}
