//! # Data Store

use log::{info, warn};
use util::module::State;

use crate::robot::{self, Robot};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    RobotProcError,
    ConsecutiveOverruns,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Robot
    pub robot: Robot,
    pub robot_input: robot::InputData,
    pub robot_output: robot::OutputData,
    pub robot_status_rpt: robot::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(robot: Robot) -> Self {
        Self {
            num_cycles: 0,
            safe: false,
            safe_cause: None,
            robot,
            robot_input: robot::InputData::default(),
            robot_output: robot::OutputData::default(),
            robot_status_rpt: robot::StatusReport::default(),
            num_consec_cycle_overruns: 0,
        }
    }

    /// Set the tick time for the cycle.
    pub fn cycle_start(&mut self, now_s: f64) {
        self.robot_input.now_s = now_s;
    }

    /// Puts the robot into safe mode with the given cause.
    ///
    /// Every actuator is commanded to neutral even if already safe, so that
    /// the cycle still ends with a defined command.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);
        }

        self.robot.make_safe();
        self.robot_output = robot::OutputData::default();
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if root_cause == cause => {
                self.safe = false;
                self.safe_cause = None;
                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::robot::test::sim_robot;

    #[test]
    fn test_safe_mode_causes() {
        let (_sim, robot) = sim_robot();
        let mut ds = DataStore::new(robot);

        assert_eq!(ds.make_unsafe(SafeModeCause::RobotProcError), Ok(()));

        ds.make_safe(SafeModeCause::RobotProcError);
        ds.make_safe(SafeModeCause::ConsecutiveOverruns);
        assert!(ds.safe);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::RobotProcError));

        assert_eq!(ds.make_unsafe(SafeModeCause::ConsecutiveOverruns), Err(()));
        assert!(ds.safe);

        assert_eq!(ds.make_unsafe(SafeModeCause::RobotProcError), Ok(()));
        assert!(!ds.safe);
        assert_eq!(ds.safe_cause, None);
    }
}
