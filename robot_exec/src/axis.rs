//! # Encoder driven axis
//!
//! A single motor with an optional quadrature encoder, moved either to an
//! encoder setpoint or for a time in a direction. Both the shooter pitch and
//! the climber winch are axes. Travel limits are in encoder counts and are
//! only checked while the encoder is fitted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{
    eqpt::{Encoder, Motor},
    EqptBuilder,
};
use log::{debug, trace};
use serde::Deserialize;

use crate::{
    cmd::{Direction, RobotMode},
    motion::{remaining_motion, DirectionSigns, MotionOutput, PositionRequest, Tiers},
};
use util::time::Timer;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters shared by every encoder driven axis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AxisParams {
    pub motor_channel: i32,

    pub encoder_a_channel: i32,

    pub encoder_b_channel: i32,

    /// Invert the manual control axis.
    pub invert_controls: bool,

    /// Demand sign which moves the axis up (increasing encoder count).
    pub up_direction: f64,

    pub down_direction: f64,

    /// Units: encoder counts
    pub encoder_threshold: f64,

    /// Units: seconds
    pub time_threshold_s: f64,

    /// Upper travel limit, zero or less for no limit.
    ///
    /// Units: encoder counts
    pub encoder_max_limit: i32,

    /// Lower travel limit, zero or less for no limit.
    ///
    /// Units: encoder counts
    pub encoder_min_limit: i32,

    /// Breakpoints on remaining encoder counts.
    pub encoder_tiers: Tiers,

    /// Breakpoints on remaining time (seconds).
    pub time_tiers: Tiers,
}

/// A motor plus optional encoder.
pub struct Axis {
    name: &'static str,
    params: AxisParams,

    motor: Option<Box<dyn Motor>>,
    encoder: Option<Box<dyn Encoder>>,

    now_s: f64,
    timer: Timer,

    count: i32,
    demand: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            motor_channel: -1,
            encoder_a_channel: -1,
            encoder_b_channel: -1,
            invert_controls: false,
            up_direction: 1.0,
            down_direction: -1.0,
            encoder_threshold: 10.0,
            time_threshold_s: 0.1,
            encoder_max_limit: -1,
            encoder_min_limit: -1,
            encoder_tiers: Tiers {
                medium_breakpoint: 50.0,
                far_breakpoint: 100.0,
                ..Tiers::default()
            },
            time_tiers: Tiers {
                medium_breakpoint: 0.5,
                far_breakpoint: 1.0,
                ..Tiers::default()
            },
        }
    }
}

impl AxisParams {
    fn max_bound(&self) -> Option<f64> {
        if self.encoder_max_limit > 0 {
            Some(self.encoder_max_limit as f64)
        } else {
            None
        }
    }

    fn min_bound(&self) -> Option<f64> {
        if self.encoder_min_limit > 0 {
            Some(self.encoder_min_limit as f64)
        } else {
            None
        }
    }
}

impl Axis {
    pub fn new(name: &'static str, params: AxisParams, eqpt: &mut dyn EqptBuilder) -> Self {
        let motor = eqpt.motor(params.motor_channel);
        let encoder = eqpt.encoder(params.encoder_a_channel, params.encoder_b_channel);

        debug!(
            "{} axis: motor fitted {}, encoder fitted {}",
            name,
            motor.is_some(),
            encoder.is_some()
        );

        Self {
            name,
            params,
            motor,
            encoder,
            now_s: 0.0,
            timer: Timer::default(),
            count: 0,
            demand: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.motor.is_some()
    }

    pub fn encoder_enabled(&self) -> bool {
        self.encoder.is_some()
    }

    /// Stop the motion timer and set the motor watchdog for the mode.
    pub fn set_robot_state(&mut self, mode: RobotMode) {
        self.timer.stop(self.now_s);

        if let Some(ref mut m) = self.motor {
            m.set_safety_enabled(mode != RobotMode::Autonomous);
        }
    }

    pub fn read_sensors(&mut self, now_s: f64) {
        self.now_s = now_s;

        if let Some(ref enc) = self.encoder {
            self.count = enc.get();
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset(self.now_s);
    }

    fn elapsed_s(&self) -> f64 {
        self.timer.elapsed(self.now_s)
    }

    /// Last encoder count read.
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Last demand written to the motor.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Move to an encoder setpoint. Needs both the motor and the encoder.
    pub fn set_position(&mut self, target: f64, speed: f64) -> bool {
        if !self.is_enabled() || !self.encoder_enabled() {
            return true;
        }

        let out = PositionRequest {
            current: self.count as f64,
            target,
            speed,
            directions: DirectionSigns::new(self.params.up_direction, self.params.down_direction),
            threshold: self.params.encoder_threshold,
            tiers: self.params.encoder_tiers,
            max_bound: self.params.max_bound(),
            min_bound: self.params.min_bound(),
        }
        .step();

        self.apply(out)
    }

    /// Move up or down for a time. Reset the timer first.
    pub fn set_time(&mut self, time_s: f64, direction: Direction, speed: f64) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let up = direction == Direction::Up;

        if self.limit_reached(up) {
            trace!("{} axis at travel limit, timed motion stopped", self.name);
            self.timer.stop(self.now_s);
            return self.apply(MotionOutput::complete());
        }

        let sign = if up {
            self.params.up_direction
        } else {
            self.params.down_direction
        };

        let out = remaining_motion(
            time_s - self.elapsed_s(),
            sign,
            speed,
            self.params.time_threshold_s,
            &self.params.time_tiers,
        );

        if out.reached {
            self.timer.stop(self.now_s);
        }

        self.apply(out)
    }

    /// Apply the control inversion and the travel limits to a manual
    /// demand.
    pub fn limit_manual(&self, speed: f64) -> f64 {
        let speed = if self.params.invert_controls {
            -speed
        } else {
            speed
        };

        let up = speed * self.params.up_direction > 0.0;
        let down = speed * self.params.down_direction > 0.0;

        if (up && self.limit_reached(true)) || (down && self.limit_reached(false)) {
            0.0
        } else {
            speed
        }
    }

    /// True if moving the manual demand `speed` would go upwards.
    pub fn is_upwards(&self, speed: f64) -> bool {
        speed * self.params.up_direction >= 0.0
    }

    /// Write a demand to the motor.
    pub fn command(&mut self, demand: f64) {
        if let Some(ref mut m) = self.motor {
            m.set(demand);
        }
        self.demand = demand;
    }

    pub fn stop(&mut self) {
        self.command(0.0);
    }

    fn limit_reached(&self, up: bool) -> bool {
        if !self.encoder_enabled() {
            return false;
        }

        if up {
            self.params
                .max_bound()
                .map_or(false, |max| self.count as f64 > max)
        } else {
            self.params
                .min_bound()
                .map_or(false, |min| (self.count as f64) < min)
        }
    }

    fn apply(&mut self, out: MotionOutput) -> bool {
        self.command(out.demand);
        out.reached
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::sim::SimEqpt;

    fn params() -> AxisParams {
        AxisParams {
            motor_channel: 3,
            encoder_a_channel: 4,
            encoder_b_channel: 5,
            encoder_max_limit: 1000,
            encoder_min_limit: 10,
            ..AxisParams::default()
        }
    }

    #[test]
    fn test_position_and_limits() {
        let mut sim = SimEqpt::new();
        let mut axis = Axis::new("test", params(), &mut sim);
        let enc = sim.encoder_at(4).unwrap();

        enc.set_count(500);
        axis.read_sensors(0.0);
        assert!(!axis.set_position(800.0, 0.5));
        assert_eq!(sim.motor_at(3).unwrap().demand(), 0.5);

        enc.set_count(795);
        axis.read_sensors(0.02);
        assert!(axis.set_position(800.0, 0.5));
        assert_eq!(axis.demand(), 0.0);

        // Past the upper limit, only downwards motion is allowed
        enc.set_count(1050);
        axis.read_sensors(0.04);
        assert!(axis.set_position(2000.0, 0.5));
        assert!(!axis.set_position(500.0, 0.5));
        assert_eq!(axis.demand(), -0.5);
    }

    #[test]
    fn test_timed_stops_at_limit() {
        let mut sim = SimEqpt::new();
        let mut axis = Axis::new("test", params(), &mut sim);

        sim.encoder_at(4).unwrap().set_count(5);
        axis.read_sensors(1.0);
        axis.reset_timer();

        assert!(axis.set_time(2.0, Direction::Down, 1.0));
        assert!(!axis.set_time(2.0, Direction::Up, 1.0));
        assert_eq!(axis.demand(), 1.0);
    }

    #[test]
    fn test_manual_inversion_and_limits() {
        let mut sim = SimEqpt::new();
        let mut axis = Axis::new(
            "test",
            AxisParams {
                invert_controls: true,
                ..params()
            },
            &mut sim,
        );

        sim.encoder_at(4).unwrap().set_count(1001);
        axis.read_sensors(0.0);

        // Inverted: a negative stick moves up, which is blocked
        assert_eq!(axis.limit_manual(-0.7), 0.0);
        assert_eq!(axis.limit_manual(0.7), -0.7);
    }

    #[test]
    fn test_missing_encoder() {
        let mut sim = SimEqpt::new();
        let mut axis = Axis::new(
            "test",
            AxisParams {
                encoder_b_channel: 0,
                ..params()
            },
            &mut sim,
        );

        assert!(!axis.encoder_enabled());
        assert!(axis.set_position(100.0, 1.0));
        assert_eq!(sim.motor_at(3).unwrap().demand(), 0.0);

        // Timed motion still works without the encoder
        axis.read_sensors(0.0);
        axis.reset_timer();
        assert!(!axis.set_time(1.0, Direction::Up, 0.5));
    }
}
