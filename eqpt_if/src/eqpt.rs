//! # Actuator and sensor traits
//!
//! Every call is synchronous and returns promptly, drivers are expected to
//! cache readings rather than block on a bus transaction.

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A speed controller driving a single motor (or a set of motors ganged onto one output).
pub trait Motor: Send {
    /// Set the normalised demand, between -1 and +1.
    fn set(&mut self, demand: f64);

    /// The last demand written to the controller.
    fn get(&self) -> f64;

    /// Enable or disable the motor safety watchdog on this controller.
    ///
    /// While enabled the controller stops the motor if it is not written to
    /// at least once per watchdog period.
    fn set_safety_enabled(&mut self, enabled: bool);
}

/// A quadrature position encoder.
pub trait Encoder: Send {
    /// Current count.
    fn get(&self) -> i32;

    /// Zero the count.
    fn reset(&mut self);
}

/// A rate gyro integrated into a heading.
pub trait Gyro: Send {
    /// Heading since the last reset.
    ///
    /// Units: degrees, clockwise positive
    fn angle_deg(&self) -> f64;

    /// Zero the heading.
    fn reset(&mut self);
}

/// A single accelerometer axis aligned with the chassis' direction of travel.
pub trait Accelerometer: Send {
    /// Units: g
    fn acceleration(&self) -> f64;
}

/// A pneumatic solenoid valve.
pub trait Solenoid: Send {
    fn set(&mut self, on: bool);

    fn get(&self) -> bool;
}

/// A compressor controlled by a pressure switch and a relay.
pub trait Compressor: Send {
    /// Start the closed loop pressure control.
    fn start(&mut self);

    /// Returns true if closed loop control is running.
    fn enabled(&self) -> bool;
}
