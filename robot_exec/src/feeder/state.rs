//! Implementations for the Feeder state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{
    eqpt::{Compressor, Solenoid},
    EqptBuilder,
};
use log::{debug, info};

use super::{FeederError, Params};
use crate::{cmd::RobotMode, drive_train::enabled_str};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct Feeder {
    compressor: Option<Box<dyn Compressor>>,
    piston: Option<Box<dyn Solenoid>>,

    piston_out: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Feeder {
    pub fn new(params: Params, eqpt: &mut dyn EqptBuilder) -> Self {
        let compressor =
            eqpt.compressor(params.pressure_switch_channel, params.compressor_relay_channel);
        let piston = eqpt.solenoid(params.solenoid_channel);

        let feeder = Self {
            compressor,
            piston,
            piston_out: false,
        };

        info!(
            "Feeder created: compressor {}, solenoid {}, feeder {}",
            enabled_str(feeder.compressor.is_some()),
            enabled_str(feeder.piston.is_some()),
            enabled_str(feeder.is_enabled())
        );

        feeder
    }

    pub fn from_file(param_file: &str, eqpt: &mut dyn EqptBuilder) -> Result<Self, FeederError> {
        let params = params::load(param_file).map_err(FeederError::ParamLoadError)?;
        Ok(Self::new(params, eqpt))
    }

    /// The feeder needs both the compressor and the solenoid.
    pub fn is_enabled(&self) -> bool {
        self.compressor.is_some() && self.piston.is_some()
    }

    /// The compressor is kept running in every mode.
    pub fn set_robot_state(&mut self, mode: RobotMode) {
        if let Some(ref mut c) = self.compressor {
            if !c.enabled() {
                c.start();
            }
        }

        debug!("Feeder mode set to {:?}", mode);
    }

    pub fn set_piston(&mut self, out: bool) {
        if !self.is_enabled() {
            return;
        }

        if let Some(ref mut p) = self.piston {
            p.set(out);
        }
        self.piston_out = out;
    }

    pub fn piston_out(&self) -> bool {
        self.piston_out
    }

    pub fn current_state(&self) -> String {
        format!(
            "Feeder: compressor running {}, piston out {}",
            self.compressor.as_ref().map_or(false, |c| c.enabled()),
            self.piston_out
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use eqpt_if::sim::SimEqpt;

    #[test]
    fn test_feeder() {
        let mut sim = SimEqpt::new();
        let mut feeder = Feeder::new(
            Params {
                pressure_switch_channel: 1,
                compressor_relay_channel: 2,
                solenoid_channel: 3,
            },
            &mut sim,
        );

        assert!(feeder.is_enabled());

        feeder.set_robot_state(RobotMode::Teleop);
        assert!(sim.compressor_at(2).unwrap().enabled());

        feeder.set_piston(true);
        assert!(sim.solenoid_at(3).unwrap().is_on());
        feeder.set_piston(false);
        assert!(!feeder.piston_out());
    }

    #[test]
    fn test_needs_compressor() {
        let mut sim = SimEqpt::new();
        let mut feeder = Feeder::new(
            Params {
                solenoid_channel: 3,
                ..Params::default()
            },
            &mut sim,
        );

        assert!(!feeder.is_enabled());
        feeder.set_piston(true);
        assert!(!sim.solenoid_at(3).unwrap().is_on());
    }
}
