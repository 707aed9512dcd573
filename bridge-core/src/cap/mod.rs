//! Per-capability conversions between hub properties and accessory
//! characteristics.

pub mod cover;
pub mod fan;
pub mod switch;
pub mod thermostat;

use serde::{Deserialize, Serialize};

use crate::host::Characteristic;

/// The closed set of write handlers an accessory service can carry. Each one is
/// bound to exactly one characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteHandler {
    OnOff,
    Brightness,
    Trigger,
    RotationSpeed,
    FanOff,
    TargetPosition,
    TargetTemperature,
    Program,
}

impl WriteHandler {
    pub fn characteristic(self) -> Characteristic {
        match self {
            Self::OnOff | Self::Trigger | Self::FanOff => Characteristic::On,
            Self::Brightness => Characteristic::Brightness,
            Self::RotationSpeed => Characteristic::RotationSpeed,
            Self::TargetPosition => Characteristic::TargetPosition,
            Self::TargetTemperature => Characteristic::TargetTemperature,
            Self::Program => Characteristic::TargetHeatingCoolingState,
        }
    }
}
