//! # Operator controller input
//!
//! Snapshot of one gamepad, sampled once per control cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of analogue axes on a gamepad.
pub const NUM_AXES: usize = 6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of a gamepad at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    /// Axis positions between -1 and +1, indexed by [`Axis`].
    pub axes: [f64; NUM_AXES],

    /// Pressed buttons, one bit per [`Button`].
    pub buttons: u16,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Analogue axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    DpadX,
    DpadY,
}

/// Digital buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    X,
    A,
    B,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
}

/// The two operator controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// Moves the chassis
    Driver,
    /// Operates the scoring mechanisms
    Scoring,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::LeftX => 0,
            Axis::LeftY => 1,
            Axis::RightX => 2,
            Axis::RightY => 3,
            Axis::DpadX => 4,
            Axis::DpadY => 5,
        }
    }
}

impl Button {
    /// All buttons, in bit order.
    pub const ALL: [Button; 10] = [
        Button::X,
        Button::A,
        Button::B,
        Button::Y,
        Button::LeftBumper,
        Button::RightBumper,
        Button::LeftTrigger,
        Button::RightTrigger,
        Button::Back,
        Button::Start,
    ];

    fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

impl GamepadState {
    /// Position of an axis.
    pub fn axis(&self, axis: Axis) -> f64 {
        self.axes[axis.index()]
    }

    /// Returns true if the button is held.
    pub fn button(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Builder style helper to set an axis.
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        self.axes[axis.index()] = value;
        self
    }

    /// Builder style helper to press a button.
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons |= button.mask();
        self
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_gamepad_state() {
        let pad = GamepadState::default()
            .with_axis(Axis::RightY, -0.5)
            .with_button(Button::Start)
            .with_button(Button::X);

        assert_eq!(pad.axis(Axis::RightY), -0.5);
        assert_eq!(pad.axis(Axis::LeftY), 0.0);
        assert!(pad.button(Button::Start));
        assert!(pad.button(Button::X));
        assert!(!pad.button(Button::Back));
    }
}
