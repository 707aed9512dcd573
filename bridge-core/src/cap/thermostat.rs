use crate::{
    error::FieldError,
    model::{Demand, Program},
};

/// Lowest target temperature the accessory model accepts. The hub goes down
/// to 7 °C; anything below is reported as this value.
pub const MIN_TARGET_TEMPERATURE: f64 = 10.0;

pub const OVERRULE_MINUTES: u32 = 60;

pub const DISPLAY_UNITS_CELSIUS: i64 = 0;

pub const STATE_OFF: i64 = 0;
pub const STATE_HEAT: i64 = 1;
pub const STATE_COOL: i64 = 2;
pub const STATE_AUTO: i64 = 3;

pub fn parse_temperature(field: &'static str, raw: &str) -> Result<f64, FieldError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::InvalidNumber { field, value: raw.to_string() })
}

pub fn clamp_setpoint(celsius: f64) -> f64 {
    if celsius < MIN_TARGET_TEMPERATURE { MIN_TARGET_TEMPERATURE } else { celsius }
}

pub fn target_state_for_program(program: Program) -> i64 {
    match program {
        Program::Off => STATE_OFF,
        Program::Day => STATE_HEAT,
        Program::Cool => STATE_COOL,
        _ => STATE_AUTO,
    }
}

pub fn states_for_demand(demand: Demand) -> Option<(i64, Option<i64>)> {
    match demand {
        Demand::None => Some((STATE_OFF, None)),
        Demand::Heating => Some((STATE_HEAT, Some(STATE_HEAT))),
        Demand::Cooling => Some((STATE_COOL, Some(STATE_COOL))),
        Demand::Unknown => None,
    }
}

/// Anything that is not off, heat or cool selects the first user program.
pub fn program_for_target_state(state: i64) -> Program {
    match state {
        STATE_OFF => Program::Off,
        STATE_HEAT => Program::Day,
        STATE_COOL => Program::Cool,
        _ => Program::Prog1,
    }
}
