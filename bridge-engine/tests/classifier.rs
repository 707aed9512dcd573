use bridge_core::{
    cap::WriteHandler,
    host::{Characteristic, CharacteristicValue, ServiceKind, ServiceRole},
    model::{Device, DeviceId},
};
use bridge_engine::classifier::{Classifier, classify};
use uuid::Uuid;

fn device(model: &str, device_type: &str) -> Device {
    Device {
        uuid: DeviceId(Uuid::new_v4()),
        name: "Living".into(),
        model: model.into(),
        device_type: device_type.into(),
        ..Default::default()
    }
}

#[test]
fn table_rows() {
    let cases: &[(&str, &str, ServiceKind, &[WriteHandler])] = &[
        ("light", "action", ServiceKind::Lightbulb, &[WriteHandler::OnOff]),
        ("dimmer", "action", ServiceKind::Lightbulb, &[WriteHandler::OnOff, WriteHandler::Brightness]),
        ("socket", "action", ServiceKind::Outlet, &[WriteHandler::OnOff]),
        ("generic", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("switched-generic", "action", ServiceKind::Switch, &[WriteHandler::OnOff]),
        ("switched-fan", "action", ServiceKind::Fan, &[WriteHandler::OnOff]),
        ("sunblind", "action", ServiceKind::WindowCovering, &[WriteHandler::TargetPosition]),
        ("venetianblind", "action", ServiceKind::WindowCovering, &[WriteHandler::TargetPosition]),
        ("rolldownshutter", "action", ServiceKind::WindowCovering, &[WriteHandler::TargetPosition]),
        ("gate", "action", ServiceKind::WindowCovering, &[WriteHandler::TargetPosition]),
        ("alloff", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("simulation", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("alarms", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("peakmode", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("solarmode", "action", ServiceKind::Switch, &[WriteHandler::Trigger]),
        ("comfort", "action", ServiceKind::Switch, &[WriteHandler::OnOff]),
        ("fan", "action", ServiceKind::Fan, &[WriteHandler::RotationSpeed, WriteHandler::FanOff]),
        (
            "thermostat",
            "thermostat",
            ServiceKind::Thermostat,
            &[WriteHandler::TargetTemperature, WriteHandler::Program],
        ),
    ];

    for (model, device_type, service, handlers) in cases {
        let c = classify(model, device_type).unwrap_or_else(|| panic!("{model} not classified"));
        assert_eq!(c.service, *service, "{model}");
        assert_eq!(c.handlers, *handlers, "{model}");
    }
}

#[test]
fn unknown_pairs_produce_nothing() {
    assert_eq!(classify("motor", "action"), None);
    assert_eq!(classify("Light", "action"), None);
    assert_eq!(classify("light", "relay"), None);
    assert_eq!(classify("thermostat", "hvac"), None);
    assert_eq!(classify("", ""), None);

    let classifier = Classifier::default();
    assert!(classifier.build_accessory(&device("audiocontrol", "action")).is_none());
    assert!(classifier.build_accessory(&device("light", "gateway")).is_none());
}

#[test]
fn suppressed_devices_produce_nothing() {
    let light = device("light", "action");
    let thermostat = device("thermostat", "thermostat");
    let classifier = Classifier::new([light.uuid, thermostat.uuid]);

    assert!(classifier.is_suppressed(light.uuid));
    assert!(classifier.build_accessory(&light).is_none());
    assert!(classifier.build_accessory(&thermostat).is_none());
    assert!(classifier.build_accessory(&device("light", "action")).is_some());
}

#[test]
fn builds_information_and_controllable_service() {
    let mut dimmer = device("dimmer", "action");
    dimmer.identifier = Some("a1b2c3".into());
    let accessory = Classifier::default().build_accessory(&dimmer).expect("dimmer accessory");

    assert_eq!(accessory.uuid, dimmer.uuid);
    assert_eq!(accessory.name, "Living");
    assert_eq!(accessory.services.len(), 2);

    let info = accessory.service(ServiceKind::AccessoryInformation).expect("information service");
    assert_eq!(info.role(), ServiceRole::Metadata);
    assert_eq!(info.get(Characteristic::Manufacturer), Some(&CharacteristicValue::from("Niko")));
    assert_eq!(info.get(Characteristic::Model), Some(&CharacteristicValue::from("dimmer")));
    assert_eq!(info.get(Characteristic::SerialNumber), Some(&CharacteristicValue::from("a1b2c3")));

    let bulb = accessory.service(ServiceKind::Lightbulb).expect("lightbulb service");
    assert_eq!(bulb.role(), ServiceRole::Controllable);
    assert_eq!(bulb.handler(Characteristic::On), Some(WriteHandler::OnOff));
    assert_eq!(bulb.handler(Characteristic::Brightness), Some(WriteHandler::Brightness));
    assert_eq!(bulb.handler(Characteristic::RotationSpeed), None);
}

#[test]
fn serial_number_falls_back_to_uuid() {
    let socket = device("socket", "action");
    let accessory = Classifier::default().build_accessory(&socket).expect("socket accessory");
    let info = accessory.service(ServiceKind::AccessoryInformation).expect("information service");
    assert_eq!(
        info.get(Characteristic::SerialNumber),
        Some(&CharacteristicValue::Text(socket.uuid.to_string()))
    );
}

#[test]
fn fan_off_write_binds_to_on() {
    let accessory =
        Classifier::default().build_accessory(&device("fan", "action")).expect("fan accessory");
    let (service, handler) = accessory.writable(Characteristic::On).expect("writable On");
    assert_eq!(service.kind(), ServiceKind::Fan);
    assert_eq!(handler, WriteHandler::FanOff);
    assert!(accessory.writable(Characteristic::TargetPosition).is_none());
}
