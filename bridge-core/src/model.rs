use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use std::fmt::{self, Display, Formatter};
use tracing::warn;
use uuid::Uuid;

#[repr(transparent)]
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(pub Uuid);

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub const TYPE_ACTION: &str = "action";
pub const TYPE_THERMOSTAT: &str = "thermostat";

/// A device as reported by the hub, either in the discovery snapshot or as an
/// event delta. Deltas usually carry only `Uuid` and `Properties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    pub uuid: DeviceId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(rename = "Type", default, skip_serializing_if = "String::is_empty")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Properties>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Switched {
    On,
    Off,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BasicState {
    On,
    Off,
    Triggered,
    Intermediate,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
    Boost,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Program {
    Off,
    Day,
    Night,
    Eco,
    Cool,
    Prog1,
    Prog2,
    Prog3,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Demand {
    None,
    Heating,
    Cooling,
    #[serde(other)]
    Unknown,
}

bitflags::bitflags! {
    /// Which fields a [`Properties`] fragment carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PropertyFields: u32 {
        const STATUS               = 1 << 0;
        const BASIC_STATE          = 1 << 1;
        const BRIGHTNESS           = 1 << 2;
        const FAN_SPEED            = 1 << 3;
        const POSITION             = 1 << 4;
        const MOVING               = 1 << 5;
        const AMBIENT_TEMPERATURE  = 1 << 6;
        const SETPOINT_TEMPERATURE = 1 << 7;
        const PROGRAM              = 1 << 8;
        const DEMAND               = 1 << 9;
        const OVERRULE_ACTIVE      = 1 << 10;
        const OVERRULE_SETPOINT    = 1 << 11;
        const OVERRULE_TIME        = 1 << 12;
    }
}

/// One property fragment. Every field is optional; absence means "not part of
/// this update", never "reset". Numeric values travel as text on the wire and
/// are parsed where they are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Properties {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<Switched>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub basic_state: Option<BasicState>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<FanSpeed>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub moving: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub ambient_temperature: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub setpoint_temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub demand: Option<Demand>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub overrule_active: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub overrule_setpoint: Option<String>,
    #[serde(default, deserialize_with = "text", skip_serializing_if = "Option::is_none")]
    pub overrule_time: Option<String>,
}

impl Properties {
    pub fn fields(&self) -> PropertyFields {
        let mut fields = PropertyFields::empty();
        fields.set(PropertyFields::STATUS, self.status.is_some());
        fields.set(PropertyFields::BASIC_STATE, self.basic_state.is_some());
        fields.set(PropertyFields::BRIGHTNESS, self.brightness.is_some());
        fields.set(PropertyFields::FAN_SPEED, self.fan_speed.is_some());
        fields.set(PropertyFields::POSITION, self.position.is_some());
        fields.set(PropertyFields::MOVING, self.moving.is_some());
        fields.set(PropertyFields::AMBIENT_TEMPERATURE, self.ambient_temperature.is_some());
        fields.set(PropertyFields::SETPOINT_TEMPERATURE, self.setpoint_temperature.is_some());
        fields.set(PropertyFields::PROGRAM, self.program.is_some());
        fields.set(PropertyFields::DEMAND, self.demand.is_some());
        fields.set(PropertyFields::OVERRULE_ACTIVE, self.overrule_active.is_some());
        fields.set(PropertyFields::OVERRULE_SETPOINT, self.overrule_setpoint.is_some());
        fields.set(PropertyFields::OVERRULE_TIME, self.overrule_time.is_some());
        fields
    }

    /// Overwrites every field that `other` carries.
    pub fn merge(&mut self, other: &Properties) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        take(&mut self.status, &other.status);
        take(&mut self.basic_state, &other.basic_state);
        take(&mut self.brightness, &other.brightness);
        take(&mut self.fan_speed, &other.fan_speed);
        take(&mut self.position, &other.position);
        take(&mut self.moving, &other.moving);
        take(&mut self.ambient_temperature, &other.ambient_temperature);
        take(&mut self.setpoint_temperature, &other.setpoint_temperature);
        take(&mut self.program, &other.program);
        take(&mut self.demand, &other.demand);
        take(&mut self.overrule_active, &other.overrule_active);
        take(&mut self.overrule_setpoint, &other.overrule_setpoint);
        take(&mut self.overrule_time, &other.overrule_time);
    }

    pub fn is_moving(&self) -> bool {
        self.moving.as_deref() == Some("True")
    }
}

impl Device {
    /// All fragments of this device folded into one record, later fragments winning.
    pub fn merged_properties(&self) -> Properties {
        let mut merged = Properties::default();
        for fragment in &self.properties {
            merged.merge(fragment);
        }
        merged
    }
}

// The hub sends numbers as strings, but accept bare JSON numbers as well.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// Enum-valued properties and their catch-all variant.
trait Lenient: Sized {
    const UNKNOWN: Self;
}

impl Lenient for Switched {
    const UNKNOWN: Self = Switched::Unknown;
}

impl Lenient for BasicState {
    const UNKNOWN: Self = BasicState::Unknown;
}

impl Lenient for FanSpeed {
    const UNKNOWN: Self = FanSpeed::Unknown;
}

impl Lenient for Program {
    const UNKNOWN: Self = Program::Other;
}

impl Lenient for Demand {
    const UNKNOWN: Self = Demand::Unknown;
}

// A non-text enum value maps to the catch-all instead of failing the device.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Lenient,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(text @ serde_json::Value::String(_)) => {
            Some(serde_json::from_value(text).unwrap_or(T::UNKNOWN))
        }
        Some(other) => {
            warn!(value = %other, "non-text enum property treated as unknown");
            Some(T::UNKNOWN)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_fields_accept_strings_and_numbers() {
        let props: Properties =
            serde_json::from_value(json!({ "Brightness": 40, "Position": "55" })).unwrap();
        assert_eq!(props.brightness.as_deref(), Some("40"));
        assert_eq!(props.position.as_deref(), Some("55"));
        assert_eq!(props.fields(), PropertyFields::BRIGHTNESS | PropertyFields::POSITION);
    }

    #[test]
    fn unknown_enum_values_do_not_fail_the_fragment() {
        let props: Properties = serde_json::from_value(
            json!({ "FanSpeed": "Turbo", "Program": "Holiday", "Demand": "Venting" }),
        )
        .unwrap();
        assert_eq!(props.fan_speed, Some(FanSpeed::Unknown));
        assert_eq!(props.program, Some(Program::Other));
        assert_eq!(props.demand, Some(Demand::Unknown));
    }

    #[test]
    fn non_text_enum_values_fall_back_to_the_catch_all() {
        let props: Properties = serde_json::from_value(
            json!({ "Status": true, "FanSpeed": 3, "Program": null, "Demand": ["Heating"] }),
        )
        .unwrap();
        assert_eq!(props.status, Some(Switched::Unknown));
        assert_eq!(props.fan_speed, Some(FanSpeed::Unknown));
        assert_eq!(props.program, None);
        assert_eq!(props.demand, Some(Demand::Unknown));
        assert_eq!(
            props.fields(),
            PropertyFields::STATUS | PropertyFields::FAN_SPEED | PropertyFields::DEMAND
        );
    }

    #[test]
    fn merge_keeps_fields_missing_from_the_newer_fragment() {
        let mut current: Properties =
            serde_json::from_value(json!({ "Position": "10", "Moving": "True" })).unwrap();
        let newer: Properties = serde_json::from_value(json!({ "Moving": "False" })).unwrap();
        current.merge(&newer);
        assert_eq!(current.position.as_deref(), Some("10"));
        assert!(!current.is_moving());
    }
}
