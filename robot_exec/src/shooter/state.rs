//! Implementations for the Shooter state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{eqpt::Motor, EqptBuilder};
use log::{debug, info};

use super::{Params, ShooterError};
use crate::{
    axis::Axis,
    cmd::{Direction, RobotMode},
    drive_train::enabled_str,
    motion::angle_to_position,
};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Shooter {
    params: Params,

    pitch: Axis,

    wheel: Option<Box<dyn Motor>>,

    wheel_demand: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Shooter {
    pub fn new(params: Params, eqpt: &mut dyn EqptBuilder) -> Self {
        let pitch = Axis::new("Pitch", params.pitch.clone(), eqpt);
        let wheel = eqpt.motor(params.shooter_motor_channel);

        info!(
            "Shooter created: pitch {}, pitch encoder {}, wheel {}",
            enabled_str(pitch.is_enabled()),
            enabled_str(pitch.encoder_enabled()),
            enabled_str(wheel.is_some())
        );

        Self {
            params,
            pitch,
            wheel,
            wheel_demand: 0.0,
        }
    }

    pub fn from_file(param_file: &str, eqpt: &mut dyn EqptBuilder) -> Result<Self, ShooterError> {
        let params = params::load(param_file).map_err(ShooterError::ParamLoadError)?;
        Ok(Self::new(params, eqpt))
    }

    pub fn pitch_enabled(&self) -> bool {
        self.pitch.is_enabled()
    }

    pub fn encoder_enabled(&self) -> bool {
        self.pitch.encoder_enabled()
    }

    pub fn wheel_enabled(&self) -> bool {
        self.wheel.is_some()
    }

    pub fn set_robot_state(&mut self, mode: RobotMode) {
        self.pitch.set_robot_state(mode);

        if let Some(ref mut m) = self.wheel {
            m.set_safety_enabled(mode != RobotMode::Autonomous);
        }

        debug!("Shooter mode set to {:?}", mode);
    }

    pub fn read_sensors(&mut self, now_s: f64) {
        self.pitch.read_sensors(now_s);
    }

    /// Reset the timer shared by timed pitch and timed shooting.
    pub fn reset_timer(&mut self) {
        self.pitch.reset_timer();
    }

    /// Move the pitch to an encoder count.
    pub fn set_pitch(&mut self, encoder_count: f64, speed: f64) -> bool {
        self.pitch.set_position(encoder_count, speed)
    }

    /// Move the pitch up or down for a time. Reset the timer first.
    pub fn set_pitch_time(&mut self, time_s: f64, direction: Direction, speed: f64) -> bool {
        self.pitch.set_time(time_s, direction, speed)
    }

    /// Move the pitch to an angle in degrees.
    pub fn set_pitch_angle(&mut self, angle_deg: f64, speed: f64) -> bool {
        let target = angle_to_position(
            angle_deg,
            self.params.angle_linear_fit_gradient,
            self.params.angle_linear_fit_constant,
        );
        self.pitch.set_position(target, speed)
    }

    /// Manual pitch control.
    pub fn move_pitch(&mut self, speed: f64, turbo: bool) {
        if !self.pitch_enabled() {
            return;
        }

        let ratio = if turbo {
            self.params.pitch_turbo_speed_ratio
        } else {
            self.params.pitch_normal_speed_ratio
        };

        let demand = self.pitch.limit_manual(speed) * ratio;
        self.pitch.command(demand);
    }

    pub fn stop_pitch(&mut self) {
        self.pitch.stop();
    }

    /// Spin the flywheel at a power percentage. Zero stops it.
    pub fn shoot(&mut self, power_percent: i32) {
        if !self.wheel_enabled() {
            return;
        }

        let demand = self.power_to_demand(power_percent);
        self.command_wheel(demand);
    }

    pub fn pitch_count(&self) -> i32 {
        self.pitch.count()
    }

    pub fn pitch_demand(&self) -> f64 {
        self.pitch.demand()
    }

    pub fn wheel_demand(&self) -> f64 {
        self.wheel_demand
    }

    pub fn current_state(&self) -> String {
        format!(
            "Shooter: pitch count {:6}, pitch demand {:5.2}, wheel demand {:5.2}",
            self.pitch.count(),
            self.pitch.demand(),
            self.wheel_demand
        )
    }

    fn power_to_demand(&self, power_percent: i32) -> f64 {
        let power = power_percent as f64 * self.params.shooter_power_adjustment_ratio;
        let min = self.params.shooter_min_power_speed;

        let speed = match power_percent {
            0 => 0.0,
            p if p > 0 => power + min,
            _ => power - min,
        };

        speed * self.params.shooter_normal_speed_ratio
    }

    fn command_wheel(&mut self, demand: f64) {
        if let Some(ref mut m) = self.wheel {
            m.set(demand);
        }
        self.wheel_demand = demand;
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
            shooter_motor_channel: 6,
            pitch: AxisParams {
                motor_channel: 7,
                encoder_a_channel: 8,
                encoder_b_channel: 9,
                ..AxisParams::default()
            },
            angle_linear_fit_gradient: 10.5,
            angle_linear_fit_constant: 3.2,
            ..Params::default()
        }
    }

    #[test]
    fn test_power_mapping() {
        let mut sim = SimEqpt::new();
        let mut shooter = Shooter::new(params(), &mut sim);
        let wheel = sim.motor_at(6).unwrap();

        shooter.shoot(100);
        assert!((wheel.demand() - 1.0).abs() < 1e-9);

        shooter.shoot(50);
        assert!((wheel.demand() - 0.7).abs() < 1e-9);

        shooter.shoot(-50);
        assert!((wheel.demand() + 0.7).abs() < 1e-9);

        shooter.shoot(0);
        assert_eq!(wheel.demand(), 0.0);
    }

    #[test]
    fn test_pitch_angle() {
        let mut sim = SimEqpt::new();
        let mut shooter = Shooter::new(params(), &mut sim);
        let enc = sim.encoder_at(8).unwrap();

        // 20 degrees is count 213
        enc.set_count(0);
        shooter.read_sensors(0.0);
        assert!(!shooter.set_pitch_angle(20.0, 1.0));
        assert_eq!(shooter.pitch_demand(), 1.0);

        enc.set_count(205);
        shooter.read_sensors(0.02);
        assert!(shooter.set_pitch_angle(20.0, 1.0));
        assert_eq!(sim.motor_at(7).unwrap().demand(), 0.0);
    }

    #[test]
    fn test_disabled_wheel() {
        let mut sim = SimEqpt::new();
        let mut shooter = Shooter::new(
            Params {
                shooter_motor_channel: 0,
                ..params()
            },
            &mut sim,
        );

        shooter.shoot(100);
        assert_eq!(shooter.wheel_demand(), 0.0);
    }
}
