use std::collections::BTreeSet;

use bridge_core::{
    cap::WriteHandler,
    host::{Accessory, Service, ServiceKind},
    model::{Device, DeviceId, TYPE_ACTION, TYPE_THERMOSTAT},
};

use crate::meta;

/// Service kind and write handlers chosen for one (model, type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub service: ServiceKind,
    pub handlers: &'static [WriteHandler],
}

const ON_OFF: &[WriteHandler] = &[WriteHandler::OnOff];
const DIMMABLE: &[WriteHandler] = &[WriteHandler::OnOff, WriteHandler::Brightness];
const TRIGGER: &[WriteHandler] = &[WriteHandler::Trigger];
const POSITION: &[WriteHandler] = &[WriteHandler::TargetPosition];
const VARIABLE_FAN: &[WriteHandler] = &[WriteHandler::RotationSpeed, WriteHandler::FanOff];
const THERMOSTAT: &[WriteHandler] = &[WriteHandler::TargetTemperature, WriteHandler::Program];

const fn row(service: ServiceKind, handlers: &'static [WriteHandler]) -> Classification {
    Classification { service, handlers }
}

/// Model tag to service kind and handlers. A new device kind is one new row.
const TABLE: &[(&str, Classification)] = &[
    ("light", row(ServiceKind::Lightbulb, ON_OFF)),
    ("dimmer", row(ServiceKind::Lightbulb, DIMMABLE)),
    ("socket", row(ServiceKind::Outlet, ON_OFF)),
    ("generic", row(ServiceKind::Switch, TRIGGER)),
    ("switched-generic", row(ServiceKind::Switch, ON_OFF)),
    ("switched-fan", row(ServiceKind::Fan, ON_OFF)),
    ("sunblind", row(ServiceKind::WindowCovering, POSITION)),
    ("venetianblind", row(ServiceKind::WindowCovering, POSITION)),
    ("rolldownshutter", row(ServiceKind::WindowCovering, POSITION)),
    ("gate", row(ServiceKind::WindowCovering, POSITION)),
    ("alloff", row(ServiceKind::Switch, TRIGGER)),
    ("simulation", row(ServiceKind::Switch, TRIGGER)),
    ("alarms", row(ServiceKind::Switch, TRIGGER)),
    ("peakmode", row(ServiceKind::Switch, TRIGGER)),
    ("solarmode", row(ServiceKind::Switch, TRIGGER)),
    ("comfort", row(ServiceKind::Switch, ON_OFF)),
    ("fan", row(ServiceKind::Fan, VARIABLE_FAN)),
    ("thermostat", row(ServiceKind::Thermostat, THERMOSTAT)),
];

pub fn classify(model: &str, device_type: &str) -> Option<Classification> {
    if device_type != TYPE_ACTION && device_type != TYPE_THERMOSTAT {
        return None;
    }
    TABLE.iter().find(|(m, _)| *m == model).map(|(_, c)| *c)
}

/// Classification plus the suppression list configured at startup.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    suppressed: BTreeSet<DeviceId>,
}

impl Classifier {
    pub fn new(suppressed: impl IntoIterator<Item = DeviceId>) -> Self {
        Self { suppressed: suppressed.into_iter().collect() }
    }

    pub fn is_suppressed(&self, uuid: DeviceId) -> bool {
        self.suppressed.contains(&uuid)
    }

    pub fn suppressed(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.suppressed.iter().copied()
    }

    /// Skeleton accessory for `device`: information service plus one
    /// controllable service carrying its write handlers. Characteristic values
    /// are left for the inbound mapper.
    pub fn build_accessory(&self, device: &Device) -> Option<Accessory> {
        if self.is_suppressed(device.uuid) {
            return None;
        }
        let classification = classify(&device.model, &device.device_type)?;

        let mut service = Service::new(classification.service, &device.name);
        for handler in classification.handlers {
            service.on_set(*handler);
        }

        let mut accessory = Accessory::new(device.uuid, &device.name);
        accessory.add_service(meta::information_service(device));
        accessory.add_service(service);
        Some(accessory)
    }
}
