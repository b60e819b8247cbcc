//! Parameters structure for the Feeder

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    pub pressure_switch_channel: i32,

    pub compressor_relay_channel: i32,

    pub solenoid_channel: i32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            pressure_switch_channel: -1,
            compressor_relay_channel: -1,
            solenoid_channel: -1,
        }
    }
}
