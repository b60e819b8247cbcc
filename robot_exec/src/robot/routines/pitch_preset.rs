//! Move the shooter pitch to a fixed angle

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{run_steps, Flow, RoutineCtx, RoutineState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Single pitch angle motion, used for the feeder station height and to get
/// the shooter out of the way before climbing.
#[derive(Debug, Default)]
pub struct PitchPreset {
    state: RoutineState<PresetStep>,

    /// Units: degrees
    angle_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum PresetStep {
    Move,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PitchPreset {
    pub fn start(&mut self, angle_deg: f64) {
        self.state = RoutineState::Step(PresetStep::Move);
        self.angle_deg = angle_deg;
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        let angle_deg = self.angle_deg;

        run_steps(&mut self.state, |PresetStep::Move| {
            if ctx
                .subs
                .shooter
                .set_pitch_angle(angle_deg, ctx.params.preset_pitch_speed)
            {
                Flow::Done
            } else {
                Flow::Wait(PresetStep::Move)
            }
        })
    }
}
