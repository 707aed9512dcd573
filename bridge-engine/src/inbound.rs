use bridge_core::{
    cap::{cover, fan, switch, thermostat},
    error::FieldError,
    host::{Characteristic, Service, ServiceRole},
    model::Properties,
};

/// Applies property fragments, in order, onto one service. `current` already
/// has this batch merged in.
// A Demand-forced target is applied after the batch so it wins over Program.
pub fn apply_properties(
    current: &Properties,
    fragments: &[Properties],
    service: &mut Service,
) -> Vec<FieldError> {
    if service.role() == ServiceRole::Metadata {
        return Vec::new();
    }

    let mut errors = Vec::new();
    let mut forced_target = None;
    for fragment in fragments {
        if let Some(target) = apply_fragment(current, fragment, service, &mut errors) {
            forced_target = Some(target);
        }
    }
    if let Some(target) = forced_target {
        service.update(Characteristic::TargetHeatingCoolingState, target);
    }
    errors
}

// Returns the target heating/cooling state a Demand field forces, if any.
fn apply_fragment(
    current: &Properties,
    props: &Properties,
    service: &mut Service,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    if let Some(on) = switch::on_state(props) {
        service.update(Characteristic::On, on);
    }

    if let Some(raw) = &props.brightness {
        match parse_int("Brightness", raw) {
            Ok(v) => service.update(Characteristic::Brightness, v),
            Err(e) => errors.push(e),
        }
    }

    if let Some((rotation, on)) = props.fan_speed.and_then(fan::rotation_for_speed) {
        service.update(Characteristic::RotationSpeed, rotation);
        service.update(Characteristic::On, on);
    }

    if let Some(raw) = &props.position {
        match cover::parse_position(raw) {
            Ok(position) => {
                let moving = current.is_moving();
                service.update(Characteristic::CurrentPosition, position);
                service.update(Characteristic::PositionState, cover::position_state(moving));
                if !moving {
                    service.update(Characteristic::TargetPosition, position);
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if let Some(raw) = &props.ambient_temperature {
        match thermostat::parse_temperature("AmbientTemperature", raw) {
            Ok(celsius) => {
                service.update(Characteristic::CurrentTemperature, celsius);
                service.update(
                    Characteristic::TemperatureDisplayUnits,
                    thermostat::DISPLAY_UNITS_CELSIUS,
                );
            }
            Err(e) => errors.push(e),
        }
    }

    if let Some(raw) = &props.setpoint_temperature {
        match thermostat::parse_temperature("SetpointTemperature", raw) {
            Ok(celsius) => {
                service.update(Characteristic::TargetTemperature, thermostat::clamp_setpoint(celsius))
            }
            Err(e) => errors.push(e),
        }
    }

    if let Some(program) = props.program {
        service.update(
            Characteristic::TargetHeatingCoolingState,
            thermostat::target_state_for_program(program),
        );
    }

    let (state, forced) = props.demand.and_then(thermostat::states_for_demand)?;
    service.update(Characteristic::CurrentHeatingCoolingState, state);
    forced
}

fn parse_int(field: &'static str, raw: &str) -> Result<i64, FieldError> {
    raw.trim().parse().map_err(|_| FieldError::InvalidNumber { field, value: raw.to_string() })
}
