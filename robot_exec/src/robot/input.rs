//! Operator controller edge detection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::input::{Axis, Button, GamepadState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current and previous state of one controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerEdges {
    previous: GamepadState,
    current: GamepadState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControllerEdges {
    /// Store this cycle's state, keeping the last one for edge detection.
    pub fn update(&mut self, state: GamepadState) {
        self.previous = self.current;
        self.current = state;
    }

    pub fn held(&self, button: Button) -> bool {
        self.current.button(button)
    }

    /// Returns true only on the cycle the button goes down.
    pub fn pressed(&self, button: Button) -> bool {
        self.current.button(button) && !self.previous.button(button)
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        self.current.axis(axis)
    }

    pub fn axis_changed(&self, axis: Axis) -> bool {
        self.current.axis(axis) != self.previous.axis(axis)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_edges() {
        let mut edges = ControllerEdges::default();
        let pressed = GamepadState::default()
            .with_button(Button::A)
            .with_axis(Axis::DpadY, 1.0);

        edges.update(pressed);
        assert!(edges.pressed(Button::A));
        assert!(edges.axis_changed(Axis::DpadY));

        // Held, no new edge
        edges.update(pressed);
        assert!(edges.held(Button::A));
        assert!(!edges.pressed(Button::A));
        assert!(!edges.axis_changed(Axis::DpadY));

        edges.update(GamepadState::default());
        assert!(!edges.held(Button::A));
        assert!(!edges.pressed(Button::A));

        edges.update(pressed);
        assert!(edges.pressed(Button::A));
    }
}
