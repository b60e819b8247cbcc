//! Time based motion

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{MotionOutput, Tiers};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A request to move in a fixed direction for a duration.
///
/// The caller owns the timer and must reset it when the motion begins.
#[derive(Debug, Clone, Copy)]
pub struct TimedRequest {
    /// Requested duration of the motion.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// Time elapsed since the motion's timer was reset.
    ///
    /// Units: seconds
    pub elapsed_s: f64,

    /// Demand sign of the requested direction.
    pub direction: f64,

    /// Requested speed scale, between 0 and 1.
    pub speed: f64,

    /// The motion completes once less than this much time remains.
    ///
    /// Units: seconds
    pub threshold_s: f64,

    /// Tiers keyed on remaining time.
    pub tiers: Tiers,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TimedRequest {
    /// Time left before the motion ends.
    pub fn remaining_s(&self) -> f64 {
        self.duration_s - self.elapsed_s
    }

    /// Evaluate the request for this cycle.
    pub fn step(&self) -> MotionOutput {
        remaining_motion(
            self.remaining_s(),
            self.direction,
            self.speed,
            self.threshold_s,
            &self.tiers,
        )
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Tiered motion keyed on a remaining quantity which counts down towards
/// zero in a known direction (time left, or distance left to travel).
///
/// Completes once the remaining quantity drops below the threshold or goes
/// negative, so overshooting also counts as complete.
pub fn remaining_motion(
    remaining: f64,
    direction: f64,
    speed: f64,
    threshold: f64,
    tiers: &Tiers,
) -> MotionOutput {
    if remaining < threshold || remaining < 0.0 {
        return MotionOutput::complete();
    }

    MotionOutput::moving(direction * speed * tiers.ratio(remaining))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn request(elapsed_s: f64) -> TimedRequest {
        TimedRequest {
            duration_s: 3.0,
            elapsed_s,
            direction: -1.0,
            speed: 0.5,
            threshold_s: 0.1,
            tiers: Tiers {
                medium_breakpoint: 0.5,
                far_breakpoint: 1.0,
                near_ratio: 0.25,
                medium_ratio: 0.5,
                far_ratio: 1.0,
            },
        }
    }

    #[test]
    fn test_timed_tiers() {
        assert_eq!(request(0.0).step(), MotionOutput::moving(-0.5));
        assert_eq!(request(2.2).step(), MotionOutput::moving(-0.25));
        assert_eq!(request(2.6).step(), MotionOutput::moving(-0.125));
    }

    #[test]
    fn test_remaining_overshoot() {
        let tiers = request(0.0).tiers;

        assert!(remaining_motion(-2.0, 1.0, 1.0, 0.5, &tiers).reached);
        assert_eq!(
            remaining_motion(4.0, 1.0, 0.5, 0.5, &tiers),
            MotionOutput::moving(0.5)
        );
    }

    #[test]
    fn test_timed_completion() {
        assert_eq!(request(2.95).step(), MotionOutput::complete());
        assert_eq!(request(10.0).step(), MotionOutput::complete());

        // A zero threshold still completes once time runs out
        let mut req = request(3.5);
        req.threshold_s = 0.0;
        assert!(req.step().reached);
    }
}
