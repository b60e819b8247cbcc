//! Position based motion

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{DirectionSigns, MotionOutput, Tiers};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A request to drive a mechanism to a position (or heading) setpoint.
#[derive(Debug, Clone, Copy)]
pub struct PositionRequest {
    /// Current sensor reading.
    pub current: f64,

    /// Setpoint to reach, in the same units as `current`.
    pub target: f64,

    /// Requested speed scale, between 0 and 1.
    pub speed: f64,

    /// Demand sign for each direction of travel.
    pub directions: DirectionSigns,

    /// The setpoint counts as reached when `|target - current|` is at most
    /// this value.
    pub threshold: f64,

    pub tiers: Tiers,

    /// Upper travel limit, checked while moving in the positive direction.
    pub max_bound: Option<f64>,

    /// Lower travel limit, checked while moving in the negative direction.
    pub min_bound: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionRequest {
    /// Evaluate the request for this cycle.
    pub fn step(&self) -> MotionOutput {
        let error = self.target - self.current;

        // Travel limits take priority over reaching the setpoint
        if let Some(max) = self.max_bound {
            if error > 0.0 && self.current > max {
                trace!("Position motion stopped at max bound {} (at {})", max, self.current);
                return MotionOutput::complete();
            }
        }
        if let Some(min) = self.min_bound {
            if error < 0.0 && self.current < min {
                trace!("Position motion stopped at min bound {} (at {})", min, self.current);
                return MotionOutput::complete();
            }
        }

        let magnitude = error.abs();

        if magnitude <= self.threshold {
            return MotionOutput::complete();
        }

        MotionOutput::moving(
            self.directions.for_error(error) * self.speed * self.tiers.ratio(magnitude),
        )
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert an angle into the equivalent position setpoint using a linear
/// calibration, rounding down to a whole sensor count.
pub fn angle_to_position(angle: f64, gradient: f64, constant: f64) -> f64 {
    (gradient * angle + constant).floor()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn request(current: f64, target: f64) -> PositionRequest {
        PositionRequest {
            current,
            target,
            speed: 0.8,
            directions: DirectionSigns::new(1.0, -1.0),
            threshold: 10.0,
            tiers: Tiers {
                medium_breakpoint: 10.0,
                far_breakpoint: 100.0,
                near_ratio: 0.3,
                medium_ratio: 0.6,
                far_ratio: 1.0,
            },
            max_bound: None,
            min_bound: None,
        }
    }

    #[test]
    fn test_far_from_setpoint() {
        let out = request(0.0, 1000.0).step();

        assert_eq!(out.demand, 1.0 * 0.8 * 1.0);
        assert!(!out.reached);
    }

    #[test]
    fn test_within_threshold() {
        let out = request(995.0, 1000.0).step();

        assert_eq!(out, MotionOutput::complete());

        // Exactly on the threshold also counts
        assert!(request(990.0, 1000.0).step().reached);
    }

    #[test]
    fn test_direction_signs() {
        let mut req = request(500.0, 0.0);
        req.directions = DirectionSigns::new(-1.0, 1.0);

        // Negative error uses the negative sign
        assert_eq!(req.step().demand, 0.8);

        let mut req = request(0.0, 50.0);
        req.directions = DirectionSigns::new(-1.0, 1.0);
        assert!((req.step().demand - (-0.8 * 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_tier_monotonicity() {
        let mut last = 0.0;

        for i in 0..2000 {
            let err = i as f64 * 0.75;
            let mag = request(0.0, err).step().demand.abs();
            assert!(mag >= last, "demand dropped at error {}", err);
            last = mag;
        }

        let mut last = 0.0;
        for i in 0..2000 {
            let err = -(i as f64) * 0.75;
            let mag = request(0.0, err).step().demand.abs();
            assert!(mag >= last, "demand dropped at error {}", err);
            last = mag;
        }
    }

    #[test]
    fn test_completion_idempotent() {
        let req = request(1003.0, 1000.0);

        for _ in 0..5 {
            assert_eq!(req.step(), MotionOutput::complete());
        }
    }

    #[test]
    fn test_bounds() {
        // Already past the max limit and asked to go further up
        let mut req = request(520.0, 1000.0);
        req.max_bound = Some(500.0);
        assert_eq!(req.step(), MotionOutput::complete());

        // Moving back down from beyond the max limit is allowed
        let mut req = request(520.0, 0.0);
        req.max_bound = Some(500.0);
        assert!(!req.step().reached);

        // Below the min limit and asked to go further down
        let mut req = request(-20.0, -500.0);
        req.min_bound = Some(-10.0);
        assert_eq!(req.step(), MotionOutput::complete());
    }

    #[test]
    fn test_angle_to_position() {
        assert_eq!(angle_to_position(20.0, 10.5, 3.2), 213.0);
        assert_eq!(angle_to_position(0.0, 10.0, -0.5), -1.0);
    }
}
