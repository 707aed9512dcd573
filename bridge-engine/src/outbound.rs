use bridge_core::{
    cap::{WriteHandler, fan, thermostat},
    error::WriteError,
    host::{Characteristic, CharacteristicValue, Service},
    hub_contract::HubCommand,
    model::DeviceId,
};

/// The single hub command a characteristic write turns into. Nothing on the
/// service is changed; the hub echoes the new state back as an event.
pub fn command_for(
    handler: WriteHandler,
    device: DeviceId,
    value: &CharacteristicValue,
    service: &Service,
) -> Result<HubCommand, WriteError> {
    let characteristic = handler.characteristic();
    let invalid = || WriteError::InvalidValue { characteristic, value: describe(value) };

    let command = match handler {
        WriteHandler::OnOff => {
            HubCommand::Status { device, on: value.as_bool().ok_or_else(invalid)? }
        }
        WriteHandler::Brightness => {
            HubCommand::Brightness { device, brightness: percent(value).ok_or_else(invalid)? }
        }
        WriteHandler::Trigger => HubCommand::TriggerBasicState { device },
        WriteHandler::RotationSpeed => {
            let rotation = value.as_f64().filter(|v| v.is_finite()).ok_or_else(invalid)?;
            HubCommand::FanSpeed { device, speed: fan::speed_for_rotation(rotation) }
        }
        WriteHandler::FanOff => HubCommand::FanSpeed { device, speed: fan::OFF_PROXY },
        WriteHandler::TargetPosition => {
            HubCommand::Position { device, position: percent(value).ok_or_else(invalid)? }
        }
        WriteHandler::TargetTemperature => {
            let setpoint = value.as_f64().filter(|v| v.is_finite()).ok_or_else(invalid)?;
            let current =
                service.get(Characteristic::CurrentTemperature).and_then(CharacteristicValue::as_f64);
            if current == Some(setpoint) {
                HubCommand::TempOverrule { device, active: false, setpoint, duration_minutes: None }
            } else {
                HubCommand::TempOverrule {
                    device,
                    active: true,
                    setpoint,
                    duration_minutes: Some(thermostat::OVERRULE_MINUTES),
                }
            }
        }
        WriteHandler::Program => {
            let state = value.as_i64().ok_or_else(invalid)?;
            HubCommand::Program { device, program: thermostat::program_for_target_state(state) }
        }
    };
    Ok(command)
}

fn percent(value: &CharacteristicValue) -> Option<u8> {
    value.as_i64().filter(|v| (0..=100).contains(v)).and_then(|v| u8::try_from(v).ok())
}

fn describe(value: &CharacteristicValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
