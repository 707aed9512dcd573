use bridge_core::{
    cap::{
        WriteHandler, cover, fan,
        thermostat::{self, MIN_TARGET_TEMPERATURE},
    },
    host::Characteristic,
    model::{Demand, FanSpeed, Program},
};

#[test]
fn fan_read_bands() {
    assert_eq!(fan::rotation_for_speed(FanSpeed::Boost), Some((100, true)));
    assert_eq!(fan::rotation_for_speed(FanSpeed::High), Some((66, true)));
    assert_eq!(fan::rotation_for_speed(FanSpeed::Medium), Some((33, true)));
    assert_eq!(fan::rotation_for_speed(FanSpeed::Low), Some((0, false)));
    assert_eq!(fan::rotation_for_speed(FanSpeed::Unknown), None);
}

#[test]
fn fan_write_bands() {
    assert_eq!(fan::speed_for_rotation(100.0), FanSpeed::Boost);
    for v in [50.0, 66.0, 99.0] {
        assert_eq!(fan::speed_for_rotation(v), FanSpeed::High, "{v}");
    }
    for v in [1.0, 33.0, 49.0] {
        assert_eq!(fan::speed_for_rotation(v), FanSpeed::Medium, "{v}");
    }
    assert_eq!(fan::speed_for_rotation(0.0), FanSpeed::Low);
}

// Read and write bands use different thresholds; a written value does not
// read back as itself.
#[test]
fn fan_bands_are_not_a_round_trip() {
    let (medium, _) = fan::rotation_for_speed(FanSpeed::Medium).unwrap();
    assert_eq!(fan::speed_for_rotation(medium as f64), FanSpeed::Medium);

    let (high, _) = fan::rotation_for_speed(FanSpeed::High).unwrap();
    assert_eq!(high, 66);
    assert_eq!(fan::speed_for_rotation(high as f64), FanSpeed::High);

    // 50 writes as High but High reads back as 66, and 33 reads as Medium
    // while the write threshold for High is 50, not 66.
    assert_eq!(fan::speed_for_rotation(50.0), FanSpeed::High);
    assert_ne!(fan::rotation_for_speed(FanSpeed::High).unwrap().0, 50);
    assert_eq!(fan::speed_for_rotation(65.0), FanSpeed::High);
    assert_eq!(fan::speed_for_rotation(34.0), FanSpeed::Medium);
}

#[test]
fn setpoint_clamp() {
    let low = thermostat::parse_temperature("SetpointTemperature", "7.5").unwrap();
    assert_eq!(thermostat::clamp_setpoint(low), MIN_TARGET_TEMPERATURE);
    let normal = thermostat::parse_temperature("SetpointTemperature", "15.2").unwrap();
    assert_eq!(thermostat::clamp_setpoint(normal), 15.2);
    assert!(thermostat::parse_temperature("SetpointTemperature", "warm").is_err());
    assert!(thermostat::parse_temperature("SetpointTemperature", "NaN").is_err());
}

#[test]
fn program_and_demand_tables() {
    assert_eq!(thermostat::target_state_for_program(Program::Off), 0);
    assert_eq!(thermostat::target_state_for_program(Program::Day), 1);
    assert_eq!(thermostat::target_state_for_program(Program::Cool), 2);
    assert_eq!(thermostat::target_state_for_program(Program::Eco), 3);
    assert_eq!(thermostat::target_state_for_program(Program::Other), 3);

    assert_eq!(thermostat::states_for_demand(Demand::None), Some((0, None)));
    assert_eq!(thermostat::states_for_demand(Demand::Heating), Some((1, Some(1))));
    assert_eq!(thermostat::states_for_demand(Demand::Cooling), Some((2, Some(2))));
    assert_eq!(thermostat::states_for_demand(Demand::Unknown), None);

    assert_eq!(thermostat::program_for_target_state(0), Program::Off);
    assert_eq!(thermostat::program_for_target_state(1), Program::Day);
    assert_eq!(thermostat::program_for_target_state(2), Program::Cool);
    assert_eq!(thermostat::program_for_target_state(3), Program::Prog1);
    assert_eq!(thermostat::program_for_target_state(-4), Program::Prog1);
}

#[test]
fn moving_cover_has_no_direction() {
    assert_eq!(cover::position_state(true), cover::POSITION_STATE_INCREASING);
    assert_eq!(cover::position_state(false), cover::POSITION_STATE_STOPPED);
}

#[test]
fn handlers_bind_to_characteristics() {
    assert_eq!(WriteHandler::Trigger.characteristic(), Characteristic::On);
    assert_eq!(WriteHandler::FanOff.characteristic(), Characteristic::On);
    assert_eq!(
        WriteHandler::Program.characteristic(),
        Characteristic::TargetHeatingCoolingState
    );
    assert_eq!("target_position".parse::<Characteristic>(), Ok(Characteristic::TargetPosition));
    assert_eq!("On".parse::<Characteristic>(), Ok(Characteristic::On));
    assert!("Hue".parse::<Characteristic>().is_err());
}
