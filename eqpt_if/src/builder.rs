//! # Equipment builder
//!
//! Subsystems are configured with channel numbers. A channel of zero or less
//! means the device is not fitted, in which case the builder hands back
//! `None` and the subsystem disables the features depending on it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use crate::{
    cam::Camera,
    eqpt::{Accelerometer, Compressor, Encoder, Gyro, Motor, Solenoid},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Factory for equipment handles.
///
/// Implementors provide the `create_*` functions, subsystems call the
/// channel-checking wrappers.
pub trait EqptBuilder {
    fn create_motor(&mut self, channel: i32) -> Option<Box<dyn Motor>>;

    fn create_encoder(&mut self, channel_a: i32, channel_b: i32) -> Option<Box<dyn Encoder>>;

    fn create_gyro(&mut self, channel: i32) -> Option<Box<dyn Gyro>>;

    fn create_accelerometer(&mut self, channel: i32) -> Option<Box<dyn Accelerometer>>;

    fn create_solenoid(&mut self, channel: i32) -> Option<Box<dyn Solenoid>>;

    fn create_compressor(
        &mut self,
        pressure_switch_channel: i32,
        relay_channel: i32,
    ) -> Option<Box<dyn Compressor>>;

    fn create_camera(&mut self, address: &str) -> Option<Box<dyn Camera>>;

    /// Build a motor if the channel is fitted.
    fn motor(&mut self, channel: i32) -> Option<Box<dyn Motor>> {
        fitted("motor", &[channel]).and_then(|_| self.create_motor(channel))
    }

    /// Build an encoder if both channels are fitted.
    fn encoder(&mut self, channel_a: i32, channel_b: i32) -> Option<Box<dyn Encoder>> {
        fitted("encoder", &[channel_a, channel_b])
            .and_then(|_| self.create_encoder(channel_a, channel_b))
    }

    /// Build a gyro if the channel is fitted.
    fn gyro(&mut self, channel: i32) -> Option<Box<dyn Gyro>> {
        fitted("gyro", &[channel]).and_then(|_| self.create_gyro(channel))
    }

    /// Build an accelerometer if the channel is fitted.
    fn accelerometer(&mut self, channel: i32) -> Option<Box<dyn Accelerometer>> {
        fitted("accelerometer", &[channel]).and_then(|_| self.create_accelerometer(channel))
    }

    /// Build a solenoid if the channel is fitted.
    fn solenoid(&mut self, channel: i32) -> Option<Box<dyn Solenoid>> {
        fitted("solenoid", &[channel]).and_then(|_| self.create_solenoid(channel))
    }

    /// Build a compressor if both the pressure switch and relay are fitted.
    fn compressor(
        &mut self,
        pressure_switch_channel: i32,
        relay_channel: i32,
    ) -> Option<Box<dyn Compressor>> {
        fitted("compressor", &[pressure_switch_channel, relay_channel])
            .and_then(|_| self.create_compressor(pressure_switch_channel, relay_channel))
    }

    /// Build a camera if an address is configured.
    fn camera(&mut self, address: &str) -> Option<Box<dyn Camera>> {
        if address.trim().is_empty() {
            debug!("No camera address configured");
            return None;
        }
        self.create_camera(address)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if the channel number refers to a fitted device.
pub fn is_fitted(channel: i32) -> bool {
    channel > 0
}

fn fitted(kind: &str, channels: &[i32]) -> Option<()> {
    if channels.iter().all(|c| is_fitted(*c)) {
        Some(())
    } else {
        debug!("No {} fitted on channel(s) {:?}", kind, channels);
        None
    }
}
