use crate::{host::Characteristic, model::DeviceId};

/// A single property field that could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field}: {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },
}

/// Why a characteristic write did not turn into a hub command.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("no accessory for device {0}")]
    UnknownAccessory(DeviceId),
    #[error("characteristic {0:?} has no write handler")]
    NotWritable(Characteristic),
    #[error("invalid value {value} for {characteristic:?}")]
    InvalidValue { characteristic: Characteristic, value: String },
    #[error("hub command failed: {0:#}")]
    Send(anyhow::Error),
    #[error("bridge is not running")]
    Unavailable,
}
