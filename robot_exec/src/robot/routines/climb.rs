//! Automatic climb
//!
//! The chassis backs into the structure at a creep speed for the whole climb.
//! The winch gets a head start with the pitch held still, then the pitch
//! moves to its climbing angle while the winch keeps pulling for a fixed
//! time. Both must finish before everything is stopped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{run_steps, Flow, RoutineCtx, RoutineState};
use crate::cmd::Direction;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AutoClimb {
    state: RoutineState<ClimbStep>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClimbStep {
    Start,

    /// Winch alone.
    HeadStart,

    /// Pitch and winch together, each latching its own completion.
    Climb { pitch_done: bool, winch_done: bool },

    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoClimb {
    pub fn start(&mut self) {
        self.state = RoutineState::Step(ClimbStep::Start);
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        ctx.subs
            .drive_train
            .creep(Direction::Backward, ctx.params.climb_creep_speed);

        run_steps(&mut self.state, |step| advance(step, ctx))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn advance(step: ClimbStep, ctx: &mut RoutineCtx) -> Flow<ClimbStep> {
    let params = ctx.params;
    let subs = &mut *ctx.subs;

    match step {
        ClimbStep::Start => {
            subs.climber.reset_timer();
            Flow::Next(ClimbStep::HeadStart)
        }
        ClimbStep::HeadStart => {
            subs.shooter.stop_pitch();

            if subs.climber.set_time(
                params.climb_head_start_time_s,
                Direction::Up,
                params.climb_head_start_winch_speed,
            ) {
                debug!("Climb head start complete");
                subs.climber.reset_timer();
                Flow::Next(ClimbStep::Climb {
                    pitch_done: false,
                    winch_done: false,
                })
            } else {
                Flow::Wait(ClimbStep::HeadStart)
            }
        }
        ClimbStep::Climb {
            mut pitch_done,
            mut winch_done,
        } => {
            if pitch_done {
                subs.shooter.stop_pitch();
            } else {
                pitch_done = subs
                    .shooter
                    .set_pitch_angle(params.climb_pitch_angle_deg, params.climb_pitch_speed);
            }

            if winch_done {
                subs.climber.stop();
            } else {
                winch_done = subs.climber.set_time(
                    params.climb_winch_time_s,
                    Direction::Up,
                    params.climb_winch_speed,
                );
            }

            if pitch_done && winch_done {
                Flow::Next(ClimbStep::Stop)
            } else {
                Flow::Wait(ClimbStep::Climb {
                    pitch_done,
                    winch_done,
                })
            }
        }
        ClimbStep::Stop => {
            subs.drive_train.stop();
            subs.shooter.stop_pitch();
            subs.climber.stop();
            Flow::Done
        }
    }
}
