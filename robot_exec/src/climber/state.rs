//! Implementations for the Climber state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::EqptBuilder;
use log::{debug, info};

use super::{ClimberError, Params};
use crate::{
    axis::Axis,
    cmd::{Direction, RobotMode},
    drive_train::enabled_str,
};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Climber {
    params: Params,

    winch: Axis,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Climber {
    pub fn new(params: Params, eqpt: &mut dyn EqptBuilder) -> Self {
        let winch = Axis::new("Winch", params.winch.clone(), eqpt);

        info!(
            "Climber created: winch {}, encoder {}",
            enabled_str(winch.is_enabled()),
            enabled_str(winch.encoder_enabled())
        );

        Self { params, winch }
    }

    pub fn from_file(param_file: &str, eqpt: &mut dyn EqptBuilder) -> Result<Self, ClimberError> {
        let params = params::load(param_file).map_err(ClimberError::ParamLoadError)?;
        Ok(Self::new(params, eqpt))
    }

    pub fn is_enabled(&self) -> bool {
        self.winch.is_enabled()
    }

    pub fn set_robot_state(&mut self, mode: RobotMode) {
        self.winch.set_robot_state(mode);
        debug!("Climber mode set to {:?}", mode);
    }

    pub fn read_sensors(&mut self, now_s: f64) {
        self.winch.read_sensors(now_s);
    }

    pub fn reset_timer(&mut self) {
        self.winch.reset_timer();
    }

    /// Move the winch to an encoder count.
    pub fn set_position(&mut self, encoder_count: f64, speed: f64) -> bool {
        self.winch.set_position(encoder_count, speed)
    }

    /// Move the winch up or down for a time. Reset the timer first.
    pub fn set_time(&mut self, time_s: f64, direction: Direction, speed: f64) -> bool {
        self.winch.set_time(time_s, direction, speed)
    }

    /// Manual winch control.
    pub fn move_winch(&mut self, speed: f64, turbo: bool) {
        if !self.is_enabled() {
            return;
        }

        let speed = self.winch.limit_manual(speed);

        let ratio = match (turbo, self.winch.is_upwards(speed)) {
            (true, true) => self.params.turbo_up_speed_ratio,
            (true, false) => self.params.turbo_down_speed_ratio,
            (false, true) => self.params.normal_up_speed_ratio,
            (false, false) => self.params.normal_down_speed_ratio,
        };

        self.winch.command(speed * ratio);
    }

    pub fn stop(&mut self) {
        self.winch.stop();
    }

    pub fn demand(&self) -> f64 {
        self.winch.demand()
    }

    pub fn current_state(&self) -> String {
        format!(
            "Climber: winch count {:6}, demand {:5.2}",
            self.winch.count(),
            self.winch.demand()
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::axis::AxisParams;
    use eqpt_if::sim::SimEqpt;

    fn params() -> Params {
        Params {
            winch: AxisParams {
                motor_channel: 10,
                encoder_a_channel: 11,
                encoder_b_channel: 12,
                ..AxisParams::default()
            },
            normal_up_speed_ratio: 0.8,
            normal_down_speed_ratio: 0.4,
            turbo_up_speed_ratio: 1.0,
            turbo_down_speed_ratio: 0.5,
        }
    }

    #[test]
    fn test_manual_up_down_ratios() {
        let mut sim = SimEqpt::new();
        let mut climber = Climber::new(params(), &mut sim);

        climber.move_winch(1.0, false);
        assert_eq!(climber.demand(), 0.8);

        climber.move_winch(-1.0, false);
        assert_eq!(climber.demand(), -0.4);

        climber.move_winch(-1.0, true);
        assert_eq!(sim.motor_at(10).unwrap().demand(), -0.5);
    }

    #[test]
    fn test_timed_winch() {
        let mut sim = SimEqpt::new();
        let mut climber = Climber::new(params(), &mut sim);

        climber.read_sensors(10.0);
        climber.reset_timer();
        assert!(!climber.set_time(1.5, Direction::Up, 0.6));
        assert_eq!(climber.demand(), 0.6);

        climber.read_sensors(11.45);
        assert!(climber.set_time(1.5, Direction::Up, 0.6));
        assert_eq!(climber.demand(), 0.0);
    }

    #[test]
    fn test_not_fitted() {
        let mut sim = SimEqpt::new();
        let mut climber = Climber::new(Params::default(), &mut sim);

        assert!(!climber.is_enabled());
        assert!(climber.set_position(500.0, 1.0));
        assert!(climber.set_time(2.0, Direction::Down, 1.0));
        climber.move_winch(1.0, true);
        assert_eq!(climber.demand(), 0.0);
    }
}
