//! The physical subsystems owned by the robot

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::EqptBuilder;
use log::info;

use super::RobotError;
use crate::{
    climber::Climber,
    cmd::{RobotMode, Subsystem},
    drive_train::DriveTrain,
    feeder::Feeder,
    shooter::Shooter,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Subsystems {
    pub drive_train: DriveTrain,
    pub shooter: Shooter,
    pub climber: Climber,
    pub feeder: Feeder,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Subsystems {
    /// Load every subsystem from its parameter file.
    pub fn from_files(eqpt: &mut dyn EqptBuilder) -> Result<Self, RobotError> {
        let drive_train = DriveTrain::from_file("drive_train.toml", eqpt)
            .map_err(RobotError::DriveTrainError)?;
        info!("DriveTrain init complete");

        let shooter =
            Shooter::from_file("shooter.toml", eqpt).map_err(RobotError::ShooterError)?;
        info!("Shooter init complete");

        let climber =
            Climber::from_file("climber.toml", eqpt).map_err(RobotError::ClimberError)?;
        info!("Climber init complete");

        let feeder = Feeder::from_file("feeder.toml", eqpt).map_err(RobotError::FeederError)?;
        info!("Feeder init complete");

        Ok(Self {
            drive_train,
            shooter,
            climber,
            feeder,
        })
    }

    pub fn set_robot_state(&mut self, mode: RobotMode) {
        self.drive_train.set_robot_state(mode);
        self.shooter.set_robot_state(mode);
        self.climber.set_robot_state(mode);
        self.feeder.set_robot_state(mode);
    }

    pub fn read_sensors(&mut self, now_s: f64) {
        self.drive_train.read_sensors(now_s);
        self.shooter.read_sensors(now_s);
        self.climber.read_sensors(now_s);
    }

    /// Command one subsystem to neutral.
    pub fn neutral(&mut self, sub: Subsystem) {
        match sub {
            Subsystem::Drive => self.drive_train.stop(),
            Subsystem::Pitch => self.shooter.stop_pitch(),
            Subsystem::Winch => self.climber.stop(),
            Subsystem::ShooterWheel => self.shooter.shoot(0),
            Subsystem::Feeder => self.feeder.set_piston(false),
        }
    }

    pub fn all_neutral(&mut self) {
        for sub in Subsystem::ALL.iter() {
            self.neutral(*sub);
        }
    }

    /// One line summary of each subsystem.
    pub fn current_states(&self) -> Vec<String> {
        vec![
            self.drive_train.current_state(),
            self.shooter.current_state(),
            self.climber.current_state(),
            self.feeder.current_state(),
        ]
    }
}
