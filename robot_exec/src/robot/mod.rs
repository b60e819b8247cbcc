//! # Robot orchestration
//!
//! The top level control module. Once per cycle it reads every subsystem's
//! sensors, handles mode changes and then, depending on the mode:
//!
//! - Disabled: commands everything to neutral, the driver may cycle the
//!   selected autonomous script.
//! - Autonomous: follows the selected script.
//! - Teleop: arbitrates operator input against the semi-autonomous routines.
//!
//! Every cycle leaves every actuator with a defined command.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod autonomous;
mod input;
mod params;
pub mod routines;
mod state;
mod subsystems;
mod teleop;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use autonomous::{Action, ActionError, ScriptRunner};
pub use input::ControllerEdges;
pub use params::*;
pub use state::*;
pub use subsystems::*;
pub use teleop::{ManualInput, MANUAL_SHOOT_POWER};

use crate::{
    climber::ClimberError, drive_train::DriveTrainError, feeder::FeederError,
    shooter::ShooterError, targeting::TargetingError,
};
use util::{archive::ArchiveError, params::LoadError, script_interpreter::ScriptError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by the robot module.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Failed to load Robot parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("DriveTrain error: {0}")]
    DriveTrainError(DriveTrainError),

    #[error("Shooter error: {0}")]
    ShooterError(ShooterError),

    #[error("Climber error: {0}")]
    ClimberError(ClimberError),

    #[error("Feeder error: {0}")]
    FeederError(FeederError),

    #[error("Targeting error: {0}")]
    TargetingError(TargetingError),

    #[error("Script error: {0}")]
    ScriptError(ScriptError),

    #[error("Could not write the status archive: {0}")]
    ArchiveError(ArchiveError),
}

// ---------------------------------------------------------------------------
// TEST FIXTURES
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{
        axis::AxisParams,
        climber::{self, Climber},
        drive_train::{self, DriveTrain},
        feeder::{self, Feeder},
        shooter::{self, Shooter},
        targeting::{self, Targeting},
    };
    use eqpt_if::sim::SimEqpt;

    /// Every subsystem fitted with simulated equipment.
    ///
    /// Drive motors on 1 and 2, gyro and accelerometer on 1, flywheel on 3,
    /// pitch on motor 4 with encoder 1/2, winch on motor 5 with encoder 3/4,
    /// and the feeder on pressure switch 1, relay 1 and solenoid 1.
    pub(crate) fn sim_subsystems() -> (SimEqpt, Subsystems) {
        let mut sim = SimEqpt::new();

        let drive_train = DriveTrain::new(
            drive_train::Params {
                left_motor_channel: 1,
                right_motor_channel: 2,
                gyro_channel: 1,
                accelerometer_channel: 1,
                ..drive_train::Params::default()
            },
            &mut sim,
        );

        let shooter = Shooter::new(
            shooter::Params {
                shooter_motor_channel: 3,
                pitch: AxisParams {
                    motor_channel: 4,
                    encoder_a_channel: 1,
                    encoder_b_channel: 2,
                    ..AxisParams::default()
                },
                ..shooter::Params::default()
            },
            &mut sim,
        );

        let climber = Climber::new(
            climber::Params {
                winch: AxisParams {
                    motor_channel: 5,
                    encoder_a_channel: 3,
                    encoder_b_channel: 4,
                    ..AxisParams::default()
                },
                ..climber::Params::default()
            },
            &mut sim,
        );

        let feeder = Feeder::new(
            feeder::Params {
                pressure_switch_channel: 1,
                compressor_relay_channel: 1,
                solenoid_channel: 1,
            },
            &mut sim,
        );

        let subs = Subsystems {
            drive_train,
            shooter,
            climber,
            feeder,
        };

        (sim, subs)
    }

    /// A robot built on [`sim_subsystems`] with no camera.
    pub(crate) fn sim_robot() -> (SimEqpt, Robot) {
        let (mut sim, subs) = sim_subsystems();
        let targeting = Targeting::new(targeting::Params::default(), &mut sim, None).unwrap();

        (sim, Robot::new(Params::default(), subs, targeting))
    }
}
