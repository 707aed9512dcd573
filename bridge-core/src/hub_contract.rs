use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{BasicState, Device, DeviceId, FanSpeed, Program, Properties, Switched};

pub const TOPIC_COMMAND: &str = "hobby/control/devices/cmd";
pub const TOPIC_RESPONSE: &str = "hobby/control/devices/rsp";
pub const TOPIC_EVENT: &str = "hobby/control/devices/evt";
pub const TOPIC_ERROR: &str = "hobby/control/devices/err";

pub const METHOD_DEVICES_LIST: &str = "devices.list";
pub const METHOD_DEVICES_CONTROL: &str = "devices.control";
pub const METHOD_DEVICES_STATUS: &str = "devices.status";
pub const METHOD_DEVICES_ADDED: &str = "devices.added";
pub const METHOD_DEVICES_REMOVED: &str = "devices.removed";

/// Envelope shared by requests, responses and events:
/// `{"Method": "...", "Params": [{"Devices": [...]}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HubMessage {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Params>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Params {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMessage {
    #[serde(default)]
    method: String,
    #[serde(default)]
    params: Option<Vec<RawParams>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawParams {
    #[serde(default)]
    devices: Vec<serde_json::Value>,
}

impl HubMessage {
    pub fn new(method: impl Into<String>, devices: Vec<Device>) -> Self {
        Self { method: method.into(), params: Some(vec![Params { devices }]) }
    }

    pub fn list_request() -> Self {
        Self { method: METHOD_DEVICES_LIST.into(), params: None }
    }

    /// Decodes a hub payload. A device entry that does not decode is dropped
    /// with a warning; the rest of the message survives.
    pub fn decode(payload: &[u8]) -> serde_json::Result<Self> {
        let raw: RawMessage = serde_json::from_slice(payload)?;
        let params = raw.params.map(|params| {
            params
                .into_iter()
                .map(|p| Params {
                    devices: p
                        .devices
                        .into_iter()
                        .filter_map(|value| match serde_json::from_value::<Device>(value) {
                            Ok(device) => Some(device),
                            Err(err) => {
                                warn!(method = %raw.method, error = %err, "skipping undecodable device");
                                None
                            }
                        })
                        .collect(),
                })
                .collect()
        });
        Ok(Self { method: raw.method, params })
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.params.iter().flatten().flat_map(|p| p.devices.iter())
    }

    pub fn into_devices(self) -> Vec<Device> {
        self.params.into_iter().flatten().flat_map(|p| p.devices).collect()
    }
}

/// Error response published on [`TOPIC_ERROR`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HubError {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub err_code: Option<String>,
    #[serde(default)]
    pub err_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HubCommand {
    Status { device: DeviceId, on: bool },
    Brightness { device: DeviceId, brightness: u8 },
    TriggerBasicState { device: DeviceId },
    FanSpeed { device: DeviceId, speed: FanSpeed },
    Position { device: DeviceId, position: u8 },
    TempOverrule { device: DeviceId, active: bool, setpoint: f64, duration_minutes: Option<u32> },
    Program { device: DeviceId, program: Program },
}

impl HubCommand {
    pub fn device(&self) -> DeviceId {
        match self {
            Self::Status { device, .. }
            | Self::Brightness { device, .. }
            | Self::TriggerBasicState { device }
            | Self::FanSpeed { device, .. }
            | Self::Position { device, .. }
            | Self::TempOverrule { device, .. }
            | Self::Program { device, .. } => *device,
        }
    }

    pub fn properties(&self) -> Properties {
        match self {
            Self::Status { on, .. } => Properties {
                status: Some(if *on { Switched::On } else { Switched::Off }),
                ..Default::default()
            },
            Self::Brightness { brightness, .. } => {
                Properties { brightness: Some(brightness.to_string()), ..Default::default() }
            }
            Self::TriggerBasicState { .. } => {
                Properties { basic_state: Some(BasicState::Triggered), ..Default::default() }
            }
            Self::FanSpeed { speed, .. } => {
                Properties { fan_speed: Some(*speed), ..Default::default() }
            }
            Self::Position { position, .. } => {
                Properties { position: Some(position.to_string()), ..Default::default() }
            }
            Self::TempOverrule { active, setpoint, duration_minutes, .. } => Properties {
                overrule_active: Some(if *active { "True" } else { "False" }.into()),
                overrule_setpoint: Some(setpoint.to_string()),
                overrule_time: duration_minutes.map(|m| m.to_string()),
                ..Default::default()
            },
            Self::Program { program, .. } => {
                Properties { program: Some(*program), ..Default::default() }
            }
        }
    }
}

impl From<&HubCommand> for HubMessage {
    fn from(cmd: &HubCommand) -> Self {
        let device =
            Device { uuid: cmd.device(), properties: vec![cmd.properties()], ..Default::default() };
        HubMessage::new(METHOD_DEVICES_CONTROL, vec![device])
    }
}
