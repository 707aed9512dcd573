use bridge_core::{
    host::{Characteristic, CharacteristicValue, Service, ServiceKind},
    model::{BasicState, Demand, FanSpeed, Program, Properties, Switched},
};
use bridge_engine::inbound::apply_properties;
use bridge_core::host::CharacteristicValue::Int;

fn merged(fragments: &[Properties]) -> Properties {
    let mut current = Properties::default();
    for f in fragments {
        current.merge(f);
    }
    current
}

fn apply(fragments: &[Properties], service: &mut Service) {
    let errors = apply_properties(&merged(fragments), fragments, service);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn status_and_basic_state_drive_on() {
    let mut service = Service::new(ServiceKind::Lightbulb, "Hall");
    apply(&[Properties { status: Some(Switched::On), ..Default::default() }], &mut service);
    assert_eq!(service.get(Characteristic::On), Some(&CharacteristicValue::Bool(true)));

    apply(&[Properties { basic_state: Some(BasicState::Off), ..Default::default() }], &mut service);
    assert_eq!(service.get(Characteristic::On), Some(&CharacteristicValue::Bool(false)));
}

#[test]
fn co_occurring_fields_are_all_applied() {
    let mut service = Service::new(ServiceKind::Lightbulb, "Kitchen");
    let fragment = Properties {
        status: Some(Switched::On),
        brightness: Some("65".into()),
        ..Default::default()
    };
    apply(&[fragment], &mut service);
    assert_eq!(service.get(Characteristic::On), Some(&CharacteristicValue::Bool(true)));
    assert_eq!(service.get(Characteristic::Brightness), Some(&Int(65)));
}

#[test]
fn same_fragment_twice_is_idempotent() {
    let fragments = [
        Properties { position: Some("45".into()), ..Default::default() },
        Properties { setpoint_temperature: Some("21.5".into()), ..Default::default() },
        Properties { program: Some(Program::Eco), demand: Some(Demand::Heating), ..Default::default() },
    ];
    let mut once = Service::new(ServiceKind::Thermostat, "Office");
    apply(&fragments, &mut once);

    let mut twice = once.clone();
    apply(&fragments, &mut twice);
    assert_eq!(once, twice);
}

#[test]
fn fan_speed_bands() {
    let mut service = Service::new(ServiceKind::Fan, "Vent");
    for (speed, rotation, on) in [
        (FanSpeed::Boost, 100, true),
        (FanSpeed::High, 66, true),
        (FanSpeed::Medium, 33, true),
        (FanSpeed::Low, 0, false),
    ] {
        apply(&[Properties { fan_speed: Some(speed), ..Default::default() }], &mut service);
        assert_eq!(service.get(Characteristic::RotationSpeed), Some(&Int(rotation)), "{speed:?}");
        assert_eq!(service.get(Characteristic::On), Some(&CharacteristicValue::Bool(on)));
    }
}

#[test]
fn position_while_moving_keeps_target() {
    let mut service = Service::new(ServiceKind::WindowCovering, "Blind");
    service.update(Characteristic::TargetPosition, 80_i64);

    let fragments = [
        Properties { position: Some("45".into()), ..Default::default() },
        Properties { moving: Some("True".into()), ..Default::default() },
    ];
    apply(&fragments, &mut service);

    assert_eq!(service.get(Characteristic::CurrentPosition), Some(&Int(45)));
    assert_eq!(service.get(Characteristic::PositionState), Some(&Int(1)));
    assert_eq!(service.get(Characteristic::TargetPosition), Some(&Int(80)));
}

#[test]
fn position_at_rest_sets_target() {
    for moving in [None, Some("False")] {
        let mut service = Service::new(ServiceKind::WindowCovering, "Blind");
        service.update(Characteristic::TargetPosition, 80_i64);

        let fragments = [Properties {
            position: Some("45".into()),
            moving: moving.map(str::to_string),
            ..Default::default()
        }];
        apply(&fragments, &mut service);

        assert_eq!(service.get(Characteristic::CurrentPosition), Some(&Int(45)));
        assert_eq!(service.get(Characteristic::PositionState), Some(&Int(2)));
        assert_eq!(service.get(Characteristic::TargetPosition), Some(&Int(45)));
    }
}

#[test]
fn moving_is_read_from_current_device_state() {
    let mut service = Service::new(ServiceKind::WindowCovering, "Gate");
    service.update(Characteristic::TargetPosition, 100_i64);

    let current = Properties {
        position: Some("30".into()),
        moving: Some("True".into()),
        ..Default::default()
    };
    let delta = [Properties { position: Some("30".into()), ..Default::default() }];
    let errors = apply_properties(&current, &delta, &mut service);

    assert!(errors.is_empty());
    assert_eq!(service.get(Characteristic::PositionState), Some(&Int(1)));
    assert_eq!(service.get(Characteristic::TargetPosition), Some(&Int(100)));
}

#[test]
fn temperatures() {
    let mut service = Service::new(ServiceKind::Thermostat, "Office");
    apply(
        &[Properties {
            ambient_temperature: Some("19.5".into()),
            setpoint_temperature: Some("7.5".into()),
            ..Default::default()
        }],
        &mut service,
    );
    assert_eq!(service.get(Characteristic::CurrentTemperature), Some(&CharacteristicValue::Float(19.5)));
    assert_eq!(service.get(Characteristic::TemperatureDisplayUnits), Some(&Int(0)));
    assert_eq!(service.get(Characteristic::TargetTemperature), Some(&CharacteristicValue::Float(10.0)));

    apply(&[Properties { setpoint_temperature: Some("15.2".into()), ..Default::default() }], &mut service);
    assert_eq!(service.get(Characteristic::TargetTemperature), Some(&CharacteristicValue::Float(15.2)));
}

#[test]
fn program_sets_target_state() {
    let mut service = Service::new(ServiceKind::Thermostat, "Office");
    for (program, state) in
        [(Program::Off, 0), (Program::Day, 1), (Program::Cool, 2), (Program::Night, 3), (Program::Other, 3)]
    {
        apply(&[Properties { program: Some(program), ..Default::default() }], &mut service);
        assert_eq!(service.get(Characteristic::TargetHeatingCoolingState), Some(&Int(state)), "{program:?}");
    }
}

#[test]
fn demand_overrides_program() {
    let mut service = Service::new(ServiceKind::Thermostat, "Office");
    let fragments = [
        Properties { program: Some(Program::Cool), ..Default::default() },
        Properties { demand: Some(Demand::Heating), ..Default::default() },
    ];
    apply(&fragments, &mut service);
    assert_eq!(service.get(Characteristic::TargetHeatingCoolingState), Some(&Int(1)));
    assert_eq!(service.get(Characteristic::CurrentHeatingCoolingState), Some(&Int(1)));

    // Program after Demand in the same batch still loses.
    let fragments = [
        Properties { demand: Some(Demand::Cooling), ..Default::default() },
        Properties { program: Some(Program::Day), ..Default::default() },
    ];
    apply(&fragments, &mut service);
    assert_eq!(service.get(Characteristic::TargetHeatingCoolingState), Some(&Int(2)));
    assert_eq!(service.get(Characteristic::CurrentHeatingCoolingState), Some(&Int(2)));
}

#[test]
fn idle_demand_leaves_program_target() {
    let mut service = Service::new(ServiceKind::Thermostat, "Office");
    let fragment = Properties {
        program: Some(Program::Day),
        demand: Some(Demand::None),
        ..Default::default()
    };
    apply(&[fragment], &mut service);
    assert_eq!(service.get(Characteristic::TargetHeatingCoolingState), Some(&Int(1)));
    assert_eq!(service.get(Characteristic::CurrentHeatingCoolingState), Some(&Int(0)));
}

#[test]
fn metadata_service_is_skipped() {
    let mut info = Service::new(ServiceKind::AccessoryInformation, "Hall");
    info.update(Characteristic::Name, "Hall");
    let before = info.clone();

    let fragments = [Properties {
        status: Some(Switched::On),
        brightness: Some("20".into()),
        ..Default::default()
    }];
    let errors = apply_properties(&merged(&fragments), &fragments, &mut info);

    assert!(errors.is_empty());
    assert_eq!(info, before);
}

#[test]
fn bad_field_does_not_block_the_rest() {
    let mut service = Service::new(ServiceKind::Thermostat, "Office");
    let fragments = [
        Properties {
            ambient_temperature: Some("warm".into()),
            setpoint_temperature: Some("21".into()),
            ..Default::default()
        },
        Properties { position: Some("half".into()), ..Default::default() },
        Properties { program: Some(Program::Day), ..Default::default() },
    ];
    let errors = apply_properties(&merged(&fragments), &fragments, &mut service);

    assert_eq!(errors.len(), 2);
    assert_eq!(service.get(Characteristic::CurrentTemperature), None);
    assert_eq!(service.get(Characteristic::TargetTemperature), Some(&CharacteristicValue::Float(21.0)));
    assert_eq!(service.get(Characteristic::TargetHeatingCoolingState), Some(&Int(1)));
}
