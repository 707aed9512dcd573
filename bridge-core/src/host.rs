use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

use crate::{cap::WriteHandler, model::DeviceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    Name,
    Manufacturer,
    Model,
    SerialNumber,
    On,
    Brightness,
    RotationSpeed,
    CurrentPosition,
    TargetPosition,
    PositionState,
    CurrentTemperature,
    TargetTemperature,
    TemperatureDisplayUnits,
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
}

impl Characteristic {
    pub const ALL: [Characteristic; 15] = [
        Self::Name,
        Self::Manufacturer,
        Self::Model,
        Self::SerialNumber,
        Self::On,
        Self::Brightness,
        Self::RotationSpeed,
        Self::CurrentPosition,
        Self::TargetPosition,
        Self::PositionState,
        Self::CurrentTemperature,
        Self::TargetTemperature,
        Self::TemperatureDisplayUnits,
        Self::CurrentHeatingCoolingState,
        Self::TargetHeatingCoolingState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Manufacturer => "Manufacturer",
            Self::Model => "Model",
            Self::SerialNumber => "SerialNumber",
            Self::On => "On",
            Self::Brightness => "Brightness",
            Self::RotationSpeed => "RotationSpeed",
            Self::CurrentPosition => "CurrentPosition",
            Self::TargetPosition => "TargetPosition",
            Self::PositionState => "PositionState",
            Self::CurrentTemperature => "CurrentTemperature",
            Self::TargetTemperature => "TargetTemperature",
            Self::TemperatureDisplayUnits => "TemperatureDisplayUnits",
            Self::CurrentHeatingCoolingState => "CurrentHeatingCoolingState",
            Self::TargetHeatingCoolingState => "TargetHeatingCoolingState",
        }
    }
}

impl FromStr for Characteristic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(&wanted)).ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CharacteristicValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                n.as_i64().map(Self::Int).or_else(|| n.as_f64().map(Self::Float))
            }
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for CharacteristicValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CharacteristicValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    AccessoryInformation,
    Lightbulb,
    Outlet,
    Switch,
    Fan,
    WindowCovering,
    Thermostat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    /// Name/manufacturer/serial; never receives device state.
    Metadata,
    Controllable,
}

impl ServiceKind {
    pub fn role(self) -> ServiceRole {
        match self {
            Self::AccessoryInformation => ServiceRole::Metadata,
            _ => ServiceRole::Controllable,
        }
    }
}

/// Typed characteristic store of one accessory service, with at most one
/// write handler per characteristic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    kind: ServiceKind,
    role: ServiceRole,
    name: String,
    characteristics: BTreeMap<Characteristic, CharacteristicValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    handlers: BTreeMap<Characteristic, WriteHandler>,
}

impl Service {
    pub fn new(kind: ServiceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            role: kind.role(),
            name: name.into(),
            characteristics: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn role(&self) -> ServiceRole {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, characteristic: Characteristic) -> Option<&CharacteristicValue> {
        self.characteristics.get(&characteristic)
    }

    pub fn update(
        &mut self,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) {
        self.characteristics.insert(characteristic, value.into());
    }

    /// Registers the write handler of the handler's characteristic, replacing
    /// any previous one.
    pub fn on_set(&mut self, handler: WriteHandler) {
        self.handlers.insert(handler.characteristic(), handler);
    }

    pub fn handler(&self, characteristic: Characteristic) -> Option<WriteHandler> {
        self.handlers.get(&characteristic).copied()
    }

    pub fn characteristics(&self) -> impl Iterator<Item = (Characteristic, &CharacteristicValue)> {
        self.characteristics.iter().map(|(c, v)| (*c, v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accessory {
    pub uuid: DeviceId,
    pub name: String,
    pub services: Vec<Service>,
}

impl Accessory {
    pub fn new(uuid: DeviceId, name: impl Into<String>) -> Self {
        Self { uuid, name: name.into(), services: Vec::new() }
    }

    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    pub fn service(&self, kind: ServiceKind) -> Option<&Service> {
        self.services.iter().find(|s| s.kind == kind)
    }

    /// The service holding a write handler for `characteristic`, if any.
    pub fn writable(&self, characteristic: Characteristic) -> Option<(&Service, WriteHandler)> {
        self.services.iter().find_map(|s| s.handler(characteristic).map(|h| (s, h)))
    }
}

/// A write on a characteristic, as delivered by the host runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteIntent {
    pub accessory: DeviceId,
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
}

/// Registration side of the host bridge runtime.
pub trait HostRuntime: Send {
    fn register_accessories(&mut self, accessories: &[Accessory]);
    fn unregister_accessories(&mut self, accessories: &[Accessory]);
}
