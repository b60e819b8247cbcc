//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono;
use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A resettable timer driven by the control loop's tick time.
///
/// The timer never reads a clock itself. Every query is given the current
/// tick time (normally the session elapsed seconds captured at the start of
/// the cycle), which keeps all waiting inside the control tick non-blocking
/// and lets tests step time explicitly.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct Timer {
    /// Tick time at which the timer was last started.
    ///
    /// Units: seconds
    start_s: Option<f64>,

    /// Elapsed time frozen by the last call to `stop`.
    ///
    /// Units: seconds
    frozen_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Timer {
    /// Reset the elapsed time to zero and start counting from `now_s`.
    pub fn reset(&mut self, now_s: f64) {
        self.start_s = Some(now_s);
        self.frozen_s = None;
    }

    /// Stop the timer, holding the elapsed time at its current value.
    pub fn stop(&mut self, now_s: f64) {
        if self.frozen_s.is_none() {
            self.frozen_s = Some(self.elapsed(now_s));
        }
    }

    /// Returns true if the timer is counting.
    pub fn is_running(&self) -> bool {
        self.start_s.is_some() && self.frozen_s.is_none()
    }

    /// Seconds elapsed since the last reset, or zero if never started.
    pub fn elapsed(&self, now_s: f64) -> f64 {
        match (self.frozen_s, self.start_s) {
            (Some(f), _) => f,
            (None, Some(s)) => (now_s - s).max(0.0),
            (None, None) => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timer() {
        let mut timer = Timer::default();

        assert_eq!(timer.elapsed(10.0), 0.0);
        assert!(!timer.is_running());

        timer.reset(10.0);
        assert!(timer.is_running());
        assert!((timer.elapsed(11.5) - 1.5).abs() < 1e-9);

        timer.stop(12.0);
        assert!(!timer.is_running());
        assert!((timer.elapsed(20.0) - 2.0).abs() < 1e-9);

        timer.reset(20.0);
        assert_eq!(timer.elapsed(20.0), 0.0);

        // Time going backwards never produces negative elapsed time
        assert_eq!(timer.elapsed(19.0), 0.0);
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }
}
