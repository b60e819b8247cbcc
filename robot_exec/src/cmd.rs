//! Command types shared by all subsystems

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Coarse operating mode of the robot, set by the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Teleop,
}

/// Direction of a time based motion.
///
/// The numbering matches the direction parameter used in autonomous scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Forward,
    Backward,
    Up,
    Down,
}

/// The independently commanded parts of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    /// Chassis drive motors
    Drive,
    /// Shooter pitch motor
    Pitch,
    /// Climber winch motor
    Winch,
    /// Shooter flywheel motor
    ShooterWheel,
    /// Disc feed piston
    Feeder,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RobotMode {
    fn default() -> Self {
        RobotMode::Disabled
    }
}

impl Direction {
    /// Decode a script direction parameter.
    pub fn from_script(value: f64) -> Option<Self> {
        if value.fract() != 0.0 {
            return None;
        }

        match value as i64 {
            0 => Some(Direction::Left),
            1 => Some(Direction::Right),
            2 => Some(Direction::Forward),
            3 => Some(Direction::Backward),
            4 => Some(Direction::Up),
            5 => Some(Direction::Down),
            _ => None,
        }
    }
}

impl Subsystem {
    pub const ALL: [Subsystem; 5] = [
        Subsystem::Drive,
        Subsystem::Pitch,
        Subsystem::Winch,
        Subsystem::ShooterWheel,
        Subsystem::Feeder,
    ];
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_direction_from_script() {
        assert_eq!(Direction::from_script(0.0), Some(Direction::Left));
        assert_eq!(Direction::from_script(3.0), Some(Direction::Backward));
        assert_eq!(Direction::from_script(5.0), Some(Direction::Down));
        assert_eq!(Direction::from_script(6.0), None);
        assert_eq!(Direction::from_script(-1.0), None);
        assert_eq!(Direction::from_script(1.5), None);
    }
}
