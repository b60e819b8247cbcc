//! Target selection and aiming

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::{debug, info};

use super::{run_steps, Flow, RoutineCtx, RoutineState};
use crate::targeting::{
    geometry::{classify_height, distance, horizontal_angle_deg, vertical_angle_deg},
    Params as TargetingParams, TargetDetection, TargetHeight, TargetSnapshot,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The targets captured for aiming and which of them is selected.
///
/// The captured snapshot is private to the control loop, the worker may
/// publish newer ones without affecting it.
#[derive(Debug)]
pub struct TargetContext {
    params: TargetingParams,

    snapshot: Option<Arc<TargetSnapshot>>,

    current: Option<usize>,
}

/// Turn to face the selected target, then pitch the shooter up to it.
#[derive(Debug, Default)]
pub struct Aim {
    state: RoutineState<AimStep>,
}

/// Capture the latest targets, select one by height and aim at it.
#[derive(Debug, Default)]
pub struct FindTarget {
    state: RoutineState<FindStep>,

    height: Option<TargetHeight>,

    aim: Aim,
}

/// Select the next captured target and aim at it.
#[derive(Debug, Default)]
pub struct CycleTarget {
    state: RoutineState<CycleStep>,

    aim: Aim,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum AimStep {
    ReadHorizontal,

    /// Heading adjustment in degrees.
    TurnToTarget(f64),

    ReadVertical,

    /// Pitch angle in degrees.
    PitchToTarget(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FindStep {
    Capture,
    Select,
    Aim,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CycleStep {
    Next,
    Aim,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TargetContext {
    pub fn new(params: TargetingParams) -> Self {
        Self {
            params,
            snapshot: None,
            current: None,
        }
    }

    /// Replace the captured targets, clearing the selection.
    pub fn capture(&mut self, snapshot: Option<Arc<TargetSnapshot>>) {
        self.snapshot = snapshot;
        self.current = None;

        debug!(
            "Captured {} targets",
            self.snapshot.as_ref().map_or(0, |s| s.len())
        );
    }

    /// Select the first target of the given height.
    ///
    /// If none match, the lowest target in the image is taken for `Low` and
    /// the highest for anything else. Returns false if there are no targets.
    pub fn select(&mut self, height: TargetHeight) -> bool {
        let snapshot = match self.snapshot {
            Some(ref s) if !s.is_empty() => s,
            _ => return false,
        };

        let exact = snapshot
            .detections()
            .iter()
            .position(|d| classify_height(d.aspect_ratio, &self.params) == height);

        self.current = match exact {
            Some(i) => Some(i),
            None if height == TargetHeight::Low => Some(0),
            None => Some(snapshot.len() - 1),
        };

        self.log_current();
        true
    }

    /// Move the selection on to the next target, wrapping at the end.
    pub fn next(&mut self) -> bool {
        let len = self.snapshot.as_ref().map_or(0, |s| s.len());
        if len == 0 {
            return false;
        }

        self.current = Some(match self.current {
            Some(i) => (i + 1) % len,
            None => 0,
        });

        self.log_current();
        true
    }

    pub fn current(&self) -> Option<&TargetDetection> {
        let index = self.current?;
        self.snapshot.as_ref()?.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn params(&self) -> &TargetingParams {
        &self.params
    }

    fn log_current(&self) {
        if let Some(target) = self.current() {
            info!(
                "Target {:?}: height {:?}, distance {:.2}, h-angle {:.2}, v-angle {:?}",
                self.current,
                classify_height(target.aspect_ratio, &self.params),
                distance(target, &self.params),
                horizontal_angle_deg(target, &self.params),
                vertical_angle_deg(target, &self.params)
            );
        }
    }
}

impl Aim {
    pub fn start(&mut self) {
        self.state = RoutineState::Step(AimStep::ReadHorizontal);
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Returns true once aimed, or immediately if no target is selected.
    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        if ctx.targets.current().is_none() {
            debug!("No target selected, nothing to aim at");
            self.finish();
            return true;
        }

        run_steps(&mut self.state, |step| advance_aim(step, ctx))
    }
}

impl FindTarget {
    pub fn start(&mut self, height: TargetHeight) {
        self.state = RoutineState::Step(FindStep::Capture);
        self.height = Some(height);
        self.aim.finish();
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
        self.aim.finish();
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        let mut state = self.state;
        let done = run_steps(&mut state, |step| self.advance(step, ctx));
        self.state = state;

        done
    }

    fn advance(&mut self, step: FindStep, ctx: &mut RoutineCtx) -> Flow<FindStep> {
        match step {
            FindStep::Capture => {
                hold(ctx);

                // Headings are measured from where the targets were seen
                ctx.subs.drive_train.reset_sensors();
                ctx.targets.capture(ctx.latest.clone());
                Flow::Wait(FindStep::Select)
            }
            FindStep::Select => {
                hold(ctx);

                let height = self.height.unwrap_or(TargetHeight::Unknown);

                if !ctx.targets.select(height) {
                    info!("No targets found");
                    return Flow::Done;
                }

                self.aim.start();
                Flow::Wait(FindStep::Aim)
            }
            FindStep::Aim => {
                if self.aim.step(ctx) {
                    Flow::Done
                } else {
                    Flow::Wait(FindStep::Aim)
                }
            }
        }
    }
}

impl CycleTarget {
    pub fn start(&mut self) {
        self.state = RoutineState::Step(CycleStep::Next);
        self.aim.finish();
    }

    pub fn finish(&mut self) {
        self.state = RoutineState::Finished;
        self.aim.finish();
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn step(&mut self, ctx: &mut RoutineCtx) -> bool {
        let mut state = self.state;
        let done = run_steps(&mut state, |step| self.advance(step, ctx));
        self.state = state;

        done
    }

    fn advance(&mut self, step: CycleStep, ctx: &mut RoutineCtx) -> Flow<CycleStep> {
        match step {
            CycleStep::Next => {
                hold(ctx);
                ctx.targets.next();
                self.aim.start();
                Flow::Wait(CycleStep::Aim)
            }
            CycleStep::Aim => {
                if self.aim.step(ctx) {
                    Flow::Done
                } else {
                    Flow::Wait(CycleStep::Aim)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn advance_aim(step: AimStep, ctx: &mut RoutineCtx) -> Flow<AimStep> {
    let target = match ctx.targets.current() {
        Some(t) => t.clone(),
        None => return Flow::Done,
    };

    // Only one of the drive and the pitch moves at a time
    match step {
        AimStep::ReadHorizontal | AimStep::TurnToTarget(_) => ctx.subs.shooter.stop_pitch(),
        AimStep::ReadVertical | AimStep::PitchToTarget(_) => ctx.subs.drive_train.stop(),
    }

    let params = ctx.targets.params();

    match step {
        AimStep::ReadHorizontal => {
            Flow::Next(AimStep::TurnToTarget(horizontal_angle_deg(&target, params)))
        }
        AimStep::TurnToTarget(deg) => {
            if ctx.subs.drive_train.adjust_heading(deg, ctx.params.aim_turn_speed) {
                Flow::Wait(AimStep::ReadVertical)
            } else {
                Flow::Wait(AimStep::TurnToTarget(deg))
            }
        }
        AimStep::ReadVertical => match vertical_angle_deg(&target, params) {
            Some(deg) => Flow::Next(AimStep::PitchToTarget(deg)),
            None => {
                info!("Target height unknown, pitch left unchanged");
                Flow::Done
            }
        },
        AimStep::PitchToTarget(deg) => {
            if ctx.subs.shooter.set_pitch_angle(deg, ctx.params.aim_pitch_speed) {
                Flow::Done
            } else {
                Flow::Wait(AimStep::PitchToTarget(deg))
            }
        }
    }
}

/// Hold the drive and the pitch at neutral.
fn hold(ctx: &mut RoutineCtx) {
    ctx.subs.drive_train.stop();
    ctx.subs.shooter.stop_pitch();
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn detection(width: u32, height: u32, y: f64) -> TargetDetection {
        let mut pixels = Vec::new();
        for j in 0..height {
            for i in 0..width {
                pixels.push((i, j));
            }
        }
        let mut det = TargetDetection::from_pixels(&pixels, 320, 240).unwrap();
        det.center_mass_y = y;
        det
    }

    fn context() -> TargetContext {
        let mut targets = TargetContext::new(TargetingParams::default());

        // Low (ratio 1.1) at the top, high (3.1) and medium (2.2) below
        targets.capture(Some(Arc::new(TargetSnapshot::new(vec![
            detection(62, 20, 100.0),
            detection(22, 20, 10.0),
            detection(44, 20, 200.0),
        ]))));
        targets
    }

    #[test]
    fn test_select_exact_height() {
        let mut targets = context();

        assert!(targets.select(TargetHeight::High));
        assert_eq!(targets.current_index(), Some(1));

        assert!(targets.select(TargetHeight::Low));
        assert_eq!(targets.current_index(), Some(0));
    }

    #[test]
    fn test_select_fallback() {
        let mut targets = TargetContext::new(TargetingParams::default());
        targets.capture(Some(Arc::new(TargetSnapshot::new(vec![
            detection(44, 20, 10.0),
            detection(44, 20, 50.0),
        ]))));

        // Neither is low, the first is taken
        assert!(targets.select(TargetHeight::Low));
        assert_eq!(targets.current_index(), Some(0));

        // Neither is high, the last is taken
        assert!(targets.select(TargetHeight::High));
        assert_eq!(targets.current_index(), Some(1));

        targets.capture(None);
        assert!(!targets.select(TargetHeight::High));
        assert!(targets.current().is_none());
    }

    #[test]
    fn test_next_wraps() {
        let mut targets = context();

        assert!(targets.next());
        assert_eq!(targets.current_index(), Some(0));
        targets.next();
        targets.next();
        assert_eq!(targets.current_index(), Some(2));
        targets.next();
        assert_eq!(targets.current_index(), Some(0));

        targets.capture(None);
        assert!(!targets.next());
    }
}
