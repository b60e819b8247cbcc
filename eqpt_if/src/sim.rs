//! # Simulated equipment
//!
//! In-memory stand-ins for every equipment trait. Each simulated device is a
//! cheap handle onto shared state, so a clone kept by the caller observes and
//! drives the same device that was handed to a subsystem.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use image::RgbImage;
use log::warn;

use crate::{
    builder::EqptBuilder,
    cam::{CamError, CamImage, Camera},
    eqpt::{Accelerometer, Compressor, Encoder, Gyro, Motor, Solenoid},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A shared floating point value.
#[derive(Debug, Clone, Default)]
pub struct SimValue(Arc<AtomicU64>);

/// Simulated motor controller.
#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    demand: SimValue,
    safety_enabled: Arc<AtomicBool>,
}

/// Simulated encoder, the count is set by the test or simulation.
#[derive(Debug, Clone, Default)]
pub struct SimEncoder(Arc<AtomicI32>);

/// Simulated gyro.
#[derive(Debug, Clone, Default)]
pub struct SimGyro(SimValue);

/// Simulated accelerometer.
#[derive(Debug, Clone, Default)]
pub struct SimAccelerometer(SimValue);

/// Simulated solenoid.
#[derive(Debug, Clone, Default)]
pub struct SimSolenoid(Arc<AtomicBool>);

/// Simulated compressor.
#[derive(Debug, Clone, Default)]
pub struct SimCompressor(Arc<AtomicBool>);

/// Simulated camera fed with frames by the caller.
#[derive(Clone, Default)]
pub struct SimCamera {
    frame: Arc<Mutex<Option<CamImage>>>,
    fresh: Arc<AtomicBool>,
    fault: Arc<AtomicBool>,
}

/// Builder producing simulated equipment, remembering every device it made
/// so that it can be inspected later.
#[derive(Default)]
pub struct SimEqpt {
    motors: HashMap<i32, SimMotor>,
    encoders: HashMap<i32, SimEncoder>,
    gyros: HashMap<i32, SimGyro>,
    accelerometers: HashMap<i32, SimAccelerometer>,
    solenoids: HashMap<i32, SimSolenoid>,
    compressors: HashMap<i32, SimCompressor>,
    cameras: HashMap<String, SimCamera>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimValue {
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }
}

impl SimMotor {
    /// Last demand written by the controlling software.
    pub fn demand(&self) -> f64 {
        self.demand.get()
    }

    /// Returns true if the safety watchdog is enabled.
    pub fn safety_enabled(&self) -> bool {
        self.safety_enabled.load(Ordering::Relaxed)
    }
}

impl Motor for SimMotor {
    fn set(&mut self, demand: f64) {
        self.demand.set(demand)
    }

    fn get(&self) -> f64 {
        self.demand.get()
    }

    fn set_safety_enabled(&mut self, enabled: bool) {
        self.safety_enabled.store(enabled, Ordering::Relaxed)
    }
}

impl SimEncoder {
    pub fn set_count(&self, count: i32) {
        self.0.store(count, Ordering::Relaxed)
    }
}

impl Encoder for SimEncoder {
    fn get(&self) -> i32 {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&mut self) {
        self.set_count(0)
    }
}

impl SimGyro {
    pub fn set_angle_deg(&self, angle: f64) {
        self.0.set(angle)
    }
}

impl Gyro for SimGyro {
    fn angle_deg(&self) -> f64 {
        self.0.get()
    }

    fn reset(&mut self) {
        self.0.set(0.0)
    }
}

impl SimAccelerometer {
    pub fn set_acceleration(&self, accel: f64) {
        self.0.set(accel)
    }
}

impl Accelerometer for SimAccelerometer {
    fn acceleration(&self) -> f64 {
        self.0.get()
    }
}

impl SimSolenoid {
    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Solenoid for SimSolenoid {
    fn set(&mut self, on: bool) {
        self.0.store(on, Ordering::Relaxed)
    }

    fn get(&self) -> bool {
        self.is_on()
    }
}

impl Compressor for SimCompressor {
    fn start(&mut self) {
        self.0.store(true, Ordering::Relaxed)
    }

    fn enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl SimCamera {
    /// Deliver a new frame to the camera.
    pub fn push_frame(&self, image: RgbImage) {
        match self.frame.lock() {
            Ok(mut f) => {
                *f = Some(CamImage::from_rgb(image));
                self.fresh.store(true, Ordering::Release);
            }
            Err(_) => warn!("Simulated camera frame lock poisoned"),
        }
    }

    /// Make the next acquisitions fail with a driver fault.
    pub fn set_fault(&self, fault: bool) {
        self.fault.store(fault, Ordering::Relaxed)
    }
}

impl Camera for SimCamera {
    fn is_fresh_image(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    fn get_image(&mut self) -> Result<CamImage, CamError> {
        self.fresh.store(false, Ordering::Release);

        if self.fault.load(Ordering::Relaxed) {
            return Err(CamError::DriverFault("simulated fault".into()));
        }

        let frame = self
            .frame
            .lock()
            .map_err(|_| CamError::DriverFault("frame lock poisoned".into()))?;

        frame.clone().ok_or(CamError::NoImage)
    }
}

impl SimEqpt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn motor_at(&self, channel: i32) -> Option<SimMotor> {
        self.motors.get(&channel).cloned()
    }

    /// Encoders are keyed by their A channel.
    pub fn encoder_at(&self, channel_a: i32) -> Option<SimEncoder> {
        self.encoders.get(&channel_a).cloned()
    }

    pub fn gyro_at(&self, channel: i32) -> Option<SimGyro> {
        self.gyros.get(&channel).cloned()
    }

    pub fn accelerometer_at(&self, channel: i32) -> Option<SimAccelerometer> {
        self.accelerometers.get(&channel).cloned()
    }

    pub fn solenoid_at(&self, channel: i32) -> Option<SimSolenoid> {
        self.solenoids.get(&channel).cloned()
    }

    /// Compressors are keyed by their relay channel.
    pub fn compressor_at(&self, relay_channel: i32) -> Option<SimCompressor> {
        self.compressors.get(&relay_channel).cloned()
    }

    pub fn camera_at(&self, address: &str) -> Option<SimCamera> {
        self.cameras.get(address).cloned()
    }
}

impl EqptBuilder for SimEqpt {
    fn create_motor(&mut self, channel: i32) -> Option<Box<dyn Motor>> {
        Some(Box::new(self.motors.entry(channel).or_default().clone()))
    }

    fn create_encoder(&mut self, channel_a: i32, _channel_b: i32) -> Option<Box<dyn Encoder>> {
        Some(Box::new(self.encoders.entry(channel_a).or_default().clone()))
    }

    fn create_gyro(&mut self, channel: i32) -> Option<Box<dyn Gyro>> {
        Some(Box::new(self.gyros.entry(channel).or_default().clone()))
    }

    fn create_accelerometer(&mut self, channel: i32) -> Option<Box<dyn Accelerometer>> {
        Some(Box::new(self.accelerometers.entry(channel).or_default().clone()))
    }

    fn create_solenoid(&mut self, channel: i32) -> Option<Box<dyn Solenoid>> {
        Some(Box::new(self.solenoids.entry(channel).or_default().clone()))
    }

    fn create_compressor(
        &mut self,
        _pressure_switch_channel: i32,
        relay_channel: i32,
    ) -> Option<Box<dyn Compressor>> {
        Some(Box::new(self.compressors.entry(relay_channel).or_default().clone()))
    }

    fn create_camera(&mut self, address: &str) -> Option<Box<dyn Camera>> {
        Some(Box::new(
            self.cameras.entry(address.to_string()).or_default().clone(),
        ))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unfitted_channels() {
        let mut sim = SimEqpt::new();

        assert!(sim.motor(0).is_none());
        assert!(sim.motor(-1).is_none());
        assert!(sim.encoder(3, 0).is_none());
        assert!(sim.compressor(1, -1).is_none());
        assert!(sim.camera("").is_none());
        assert!(sim.motor_at(0).is_none());
    }

    #[test]
    fn test_handles_share_state() {
        let mut sim = SimEqpt::new();

        let mut motor = sim.motor(2).unwrap();
        motor.set(0.75);
        assert_eq!(sim.motor_at(2).unwrap().demand(), 0.75);

        let enc = sim.encoder(4, 5).unwrap();
        sim.encoder_at(4).unwrap().set_count(120);
        assert_eq!(enc.get(), 120);
    }

    #[test]
    fn test_camera_freshness() {
        let mut sim = SimEqpt::new();
        let mut cam = sim.camera("10.0.0.11").unwrap();
        let handle = sim.camera_at("10.0.0.11").unwrap();

        assert!(!cam.is_fresh_image());
        assert!(matches!(cam.get_image(), Err(CamError::NoImage)));

        handle.push_frame(RgbImage::new(4, 3));
        assert!(cam.is_fresh_image());
        assert_eq!(cam.get_image().unwrap().dimensions(), (4, 3));
        assert!(!cam.is_fresh_image());

        handle.set_fault(true);
        assert!(matches!(cam.get_image(), Err(CamError::DriverFault(_))));
    }
}
