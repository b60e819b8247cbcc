//! Implementations for the DriveTrain state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use eqpt_if::{
    eqpt::{Accelerometer, Gyro, Motor},
    EqptBuilder,
};
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{DriveTrainError, Params};
use crate::{
    cmd::{Direction, RobotMode},
    motion::{remaining_motion, DirectionSigns, MotionOutput, PositionRequest, TimedRequest},
};
use util::{
    maths::{clamp, slew_limit},
    params,
    time::Timer,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive train state
pub struct DriveTrain {
    params: Params,

    left_motor: Option<Box<dyn Motor>>,
    right_motor: Option<Box<dyn Motor>>,
    gyro: Option<Box<dyn Gyro>>,
    accelerometer: Option<Box<dyn Accelerometer>>,

    mode: RobotMode,

    /// Tick time of the last sensor read.
    now_s: f64,

    /// Timer for time based motions.
    timer: Timer,

    /// Tick time of the previous accelerometer sample.
    last_accel_sample_s: Option<f64>,

    /// Heading latched by the first call of a heading adjustment.
    initial_heading_deg: Option<f64>,

    /// Last manual demand, used for slew limiting.
    previous_manual: DriveDemand,

    sensors: DriveSensors,

    demand: DriveDemand,
}

/// Arcade style demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveDemand {
    /// Fore-aft demand, positive forwards when `forward_direction` is +1.
    pub linear: f64,

    /// Turning demand.
    pub turn: f64,
}

/// Sensor readings and integrated quantities.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DriveSensors {
    /// Units: degrees
    pub heading_deg: f64,

    pub acceleration: f64,

    pub velocity: f64,

    /// Distance travelled since the last sensor reset.
    pub distance_travelled: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveTrain {
    /// Build the drive train from its parameters, creating the equipment it
    /// needs. Missing equipment disables the features that depend on it.
    pub fn new(params: Params, eqpt: &mut dyn EqptBuilder) -> Self {
        let left_motor = eqpt.motor(params.left_motor_channel);
        let right_motor = eqpt.motor(params.right_motor_channel);
        let gyro = eqpt.gyro(params.gyro_channel);
        let accelerometer = eqpt.accelerometer(params.accelerometer_channel);

        let dt = Self {
            params,
            left_motor,
            right_motor,
            gyro,
            accelerometer,
            mode: RobotMode::Disabled,
            now_s: 0.0,
            timer: Timer::default(),
            last_accel_sample_s: None,
            initial_heading_deg: None,
            previous_manual: DriveDemand::default(),
            sensors: DriveSensors::default(),
            demand: DriveDemand::default(),
        };

        info!(
            "DriveTrain created: drive {}, gyro {}, accelerometer {}",
            enabled_str(dt.is_enabled()),
            enabled_str(dt.gyro.is_some()),
            enabled_str(dt.accelerometer.is_some())
        );

        dt
    }

    /// Load parameters from the given parameter file and build the drive
    /// train.
    pub fn from_file(param_file: &str, eqpt: &mut dyn EqptBuilder) -> Result<Self, DriveTrainError> {
        let params = params::load(param_file).map_err(DriveTrainError::ParamLoadError)?;
        Ok(Self::new(params, eqpt))
    }

    /// Returns true if both sides of the drive are fitted.
    pub fn is_enabled(&self) -> bool {
        self.left_motor.is_some() && self.right_motor.is_some()
    }

    pub fn gyro_enabled(&self) -> bool {
        self.gyro.is_some()
    }

    pub fn accelerometer_enabled(&self) -> bool {
        self.accelerometer.is_some()
    }

    /// Perform the mode change actions.
    pub fn set_robot_state(&mut self, mode: RobotMode) {
        self.mode = mode;

        self.timer.stop(self.now_s);

        // Restart distance integration
        self.last_accel_sample_s = None;
        self.sensors.velocity = 0.0;
        self.sensors.distance_travelled = 0.0;

        // The motor watchdog is only relaxed while following a script
        let safety = mode != RobotMode::Autonomous;
        for m in self.motors_mut() {
            m.set_safety_enabled(safety);
        }

        debug!("DriveTrain mode set to {:?}", mode);
    }

    /// Sample the sensors for this cycle.
    pub fn read_sensors(&mut self, now_s: f64) {
        self.now_s = now_s;

        if let Some(ref gyro) = self.gyro {
            self.sensors.heading_deg = gyro.angle_deg();
        }

        if let Some(ref accel) = self.accelerometer {
            self.sensors.acceleration = accel.acceleration();

            if let Some(last) = self.last_accel_sample_s {
                let dt = (now_s - last).max(0.0);
                self.sensors.velocity += self.sensors.acceleration * dt;
                self.sensors.distance_travelled += self.sensors.velocity * dt;
            }
            self.last_accel_sample_s = Some(now_s);
        }
    }

    /// Zero the heading and the distance travelled.
    ///
    /// A heading adjustment in progress is dropped, the next one latches the
    /// zeroed heading.
    pub fn reset_sensors(&mut self) {
        self.initial_heading_deg = None;
        if let Some(ref mut gyro) = self.gyro {
            gyro.reset();
        }
        self.sensors.heading_deg = 0.0;
        self.sensors.velocity = 0.0;
        self.sensors.distance_travelled = 0.0;
        self.last_accel_sample_s = Some(self.now_s);
    }

    /// Reset and start the timer used by time based motions.
    pub fn reset_timer(&mut self) {
        self.timer.reset(self.now_s);
    }

    /// Turn by `adjustment_deg` relative to the heading at the first call.
    ///
    /// Returns true once the heading is reached, or immediately if the drive
    /// or gyro is not fitted.
    pub fn adjust_heading(&mut self, adjustment_deg: f64, speed: f64) -> bool {
        if !self.is_enabled() || !self.gyro_enabled() {
            self.initial_heading_deg = None;
            return true;
        }

        let initial = match self.initial_heading_deg {
            Some(h) => h,
            None => {
                self.initial_heading_deg = Some(self.sensors.heading_deg);
                self.sensors.heading_deg
            }
        };

        let out = self.heading_motion(initial + adjustment_deg, speed);
        self.apply_turn(out);

        if out.reached {
            self.initial_heading_deg = None;
        }
        out.reached
    }

    /// Turn to an absolute heading.
    pub fn turn_heading(&mut self, heading_deg: f64, speed: f64) -> bool {
        if !self.is_enabled() || !self.gyro_enabled() {
            return true;
        }

        let out = self.heading_motion(heading_deg, speed);
        self.apply_turn(out);
        out.reached
    }

    /// Drive forwards (positive) or backwards (negative) by a distance.
    ///
    /// The distance is measured from the last call to `reset_sensors`.
    pub fn drive_distance(&mut self, distance: f64, speed: f64) -> bool {
        if !self.is_enabled() || !self.accelerometer_enabled() {
            return true;
        }

        let direction = if distance > 0.0 {
            self.params.forward_direction
        } else {
            self.params.backward_direction
        };

        let out = remaining_motion(
            distance.abs() - self.sensors.distance_travelled.abs(),
            direction,
            speed,
            self.params.distance_threshold,
            &self.params.distance_tiers,
        );

        self.command(DriveDemand { linear: out.demand, turn: 0.0 });
        out.reached
    }

    /// Drive forwards or backwards for a time. Reset the timer first.
    pub fn drive_time(&mut self, time_s: f64, direction: Direction, speed: f64) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let sign = match direction {
            Direction::Forward => self.params.forward_direction,
            _ => self.params.backward_direction,
        };

        let out = TimedRequest {
            duration_s: time_s,
            elapsed_s: self.timer.elapsed(self.now_s),
            direction: sign,
            speed,
            threshold_s: self.params.time_threshold_s,
            tiers: self.params.linear_time_tiers,
        }
        .step();

        if out.reached {
            self.timer.stop(self.now_s);
        }

        self.command(DriveDemand { linear: out.demand, turn: 0.0 });
        out.reached
    }

    /// Turn left or right for a time. Reset the timer first.
    pub fn turn_time(&mut self, time_s: f64, direction: Direction, speed: f64) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let sign = match direction {
            Direction::Left => self.params.left_direction,
            _ => self.params.right_direction,
        };

        let out = TimedRequest {
            duration_s: time_s,
            elapsed_s: self.timer.elapsed(self.now_s),
            direction: sign,
            speed,
            threshold_s: self.params.time_threshold_s,
            tiers: self.params.turning_time_tiers,
        }
        .step();

        if out.reached {
            self.timer.stop(self.now_s);
        }

        self.apply_turn(out);
        out.reached
    }

    /// Manual arcade drive.
    pub fn drive(&mut self, linear: f64, turn: f64, turbo: bool) {
        if !self.is_enabled() {
            return;
        }

        // Manual control cancels any latched heading adjustment
        self.initial_heading_deg = None;

        let (linear_ratio, turn_ratio) = if turbo {
            (self.params.turbo_linear_speed_ratio, self.params.turbo_turning_speed_ratio)
        } else {
            (self.params.normal_linear_speed_ratio, self.params.normal_turning_speed_ratio)
        };

        let demand = DriveDemand {
            linear: slew_limit(
                self.previous_manual.linear,
                linear * linear_ratio,
                self.params.max_linear_speed_change,
            ),
            turn: slew_limit(
                self.previous_manual.turn,
                turn * turn_ratio,
                self.params.max_turn_speed_change,
            ),
        };

        self.previous_manual = demand;
        self.command(demand);
    }

    /// Command the drive to neutral immediately.
    pub fn stop(&mut self) {
        self.initial_heading_deg = None;
        self.previous_manual = DriveDemand::default();
        self.command(DriveDemand::default());
    }

    /// Drive forwards or backwards at a fixed speed, bypassing the manual
    /// ratios and slew limiting.
    pub fn creep(&mut self, direction: Direction, speed: f64) {
        if !self.is_enabled() {
            return;
        }

        let sign = match direction {
            Direction::Forward => self.params.forward_direction,
            _ => self.params.backward_direction,
        };

        self.command(DriveDemand { linear: sign * speed, turn: 0.0 });
    }

    /// The demand written on the last command.
    pub fn demand(&self) -> DriveDemand {
        self.demand
    }

    pub fn sensors(&self) -> DriveSensors {
        self.sensors
    }

    /// One line summary for diagnostics.
    pub fn current_state(&self) -> String {
        format!(
            "DriveTrain: heading {:6.1} deg, accel {:5.2}, distance {:6.2}, demand ({:5.2}, {:5.2})",
            self.sensors.heading_deg,
            self.sensors.acceleration,
            self.sensors.distance_travelled,
            self.demand.linear,
            self.demand.turn
        )
    }

    // ---- PRIVATE ----

    fn heading_motion(&self, target_deg: f64, speed: f64) -> MotionOutput {
        PositionRequest {
            current: self.sensors.heading_deg,
            target: target_deg,
            speed,
            directions: DirectionSigns::new(
                self.params.right_direction,
                self.params.left_direction,
            ),
            threshold: self.params.heading_threshold_deg,
            tiers: self.params.heading_tiers,
            max_bound: None,
            min_bound: None,
        }
        .step()
    }

    fn apply_turn(&mut self, out: MotionOutput) {
        self.command(DriveDemand { linear: 0.0, turn: out.demand });
    }

    fn command(&mut self, demand: DriveDemand) {
        let left = clamp(demand.linear + demand.turn, -1.0, 1.0);
        let right = clamp(demand.linear - demand.turn, -1.0, 1.0);

        if let Some(ref mut m) = self.left_motor {
            m.set(left);
        }
        if let Some(ref mut m) = self.right_motor {
            m.set(right);
        }

        trace!("DriveTrain demand {:?} -> L {:.3} R {:.3}", demand, left, right);

        self.demand = demand;
    }

    fn motors_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Motor>> {
        self.left_motor
            .iter_mut()
            .chain(self.right_motor.iter_mut())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub(crate) fn enabled_str(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::sim::SimEqpt;

    fn params() -> Params {
        Params {
            left_motor_channel: 1,
            right_motor_channel: 2,
            gyro_channel: 1,
            accelerometer_channel: 1,
            ..Params::default()
        }
    }

    #[test]
    fn test_adjust_heading_latches_initial() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(params(), &mut sim);
        let gyro = sim.gyro_at(1).unwrap();

        gyro.set_angle_deg(10.0);
        dt.read_sensors(0.0);

        // 30 degrees to the right, far tier
        assert!(!dt.adjust_heading(30.0, 0.5));
        assert_eq!(dt.demand().turn, 0.5);
        assert_eq!(sim.motor_at(1).unwrap().demand(), 0.5);
        assert_eq!(sim.motor_at(2).unwrap().demand(), -0.5);

        // Heading moves, target stays at 40
        gyro.set_angle_deg(38.5);
        dt.read_sensors(0.02);
        assert!(dt.adjust_heading(30.0, 0.5));
        assert_eq!(dt.demand(), DriveDemand::default());

        // Next adjustment latches afresh
        dt.read_sensors(0.04);
        assert!(!dt.adjust_heading(-20.0, 1.0));
        assert!(dt.demand().turn < 0.0);
    }

    #[test]
    fn test_reset_sensors_drops_latched_heading() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(params(), &mut sim);
        let gyro = sim.gyro_at(1).unwrap();

        gyro.set_angle_deg(10.0);
        dt.read_sensors(0.0);
        assert!(!dt.adjust_heading(30.0, 0.5));

        // Zeroed part way through the turn, the next adjustment starts from 0
        dt.reset_sensors();
        dt.read_sensors(0.02);
        assert!(!dt.adjust_heading(10.0, 0.5));

        gyro.set_angle_deg(9.0);
        dt.read_sensors(0.04);
        assert!(dt.adjust_heading(10.0, 0.5));
        assert_eq!(dt.demand(), DriveDemand::default());
    }

    #[test]
    fn test_disabled_gyro_completes_immediately() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(Params { gyro_channel: 0, ..params() }, &mut sim);

        assert!(dt.adjust_heading(90.0, 1.0));
        assert!(dt.turn_heading(90.0, 1.0));
        assert_eq!(sim.motor_at(1).unwrap().demand(), 0.0);
    }

    #[test]
    fn test_drive_time() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(params(), &mut sim);

        dt.read_sensors(5.0);
        dt.reset_timer();

        assert!(!dt.drive_time(2.0, Direction::Backward, 0.4));
        assert_eq!(dt.demand().linear, -0.4);

        dt.read_sensors(6.95);
        assert!(dt.drive_time(2.0, Direction::Backward, 0.4));
        assert_eq!(dt.demand().linear, 0.0);
    }

    #[test]
    fn test_drive_distance_integrates_acceleration() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(params(), &mut sim);
        let accel = sim.accelerometer_at(1).unwrap();

        dt.read_sensors(0.0);
        dt.reset_sensors();
        assert!(!dt.drive_distance(-4.0, 1.0));
        assert_eq!(dt.demand().linear, -1.0);

        // 2 units/s^2 for 2 s in 10 ms steps travels about 4 units
        accel.set_acceleration(-2.0);
        let mut t = 0.0;
        while t < 2.0 {
            t += 0.01;
            dt.read_sensors(t);
        }
        assert!(dt.sensors().distance_travelled < -3.5);
        assert!(dt.drive_distance(-4.0, 1.0));
    }

    #[test]
    fn test_manual_drive_slew_and_turbo() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(
            Params {
                max_linear_speed_change: 0.25,
                turbo_linear_speed_ratio: 1.0,
                normal_linear_speed_ratio: 0.5,
                ..params()
            },
            &mut sim,
        );

        dt.drive(1.0, 0.0, false);
        assert_eq!(dt.demand().linear, 0.25);
        dt.drive(1.0, 0.0, false);
        assert_eq!(dt.demand().linear, 0.5);
        dt.drive(1.0, 0.0, true);
        assert_eq!(dt.demand().linear, 0.75);

        // Stopping is never rate limited
        dt.stop();
        assert_eq!(dt.demand(), DriveDemand::default());
        assert_eq!(sim.motor_at(1).unwrap().demand(), 0.0);
    }

    #[test]
    fn test_safety_interlock_follows_mode() {
        let mut sim = SimEqpt::new();
        let mut dt = DriveTrain::new(params(), &mut sim);

        dt.set_robot_state(RobotMode::Autonomous);
        assert!(!sim.motor_at(1).unwrap().safety_enabled());

        dt.set_robot_state(RobotMode::Teleop);
        assert!(sim.motor_at(2).unwrap().safety_enabled());
    }
}
