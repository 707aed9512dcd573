use bridge_core::{
    host::{Characteristic, Service, ServiceKind},
    model::Device,
};

pub const MANUFACTURER: &str = "Niko";

pub fn information_service(device: &Device) -> Service {
    let serial = device
        .identifier
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| device.uuid.to_string());

    let mut service = Service::new(ServiceKind::AccessoryInformation, &device.name);
    service.update(Characteristic::Name, device.name.as_str());
    service.update(Characteristic::Manufacturer, MANUFACTURER);
    service.update(Characteristic::Model, device.model.as_str());
    service.update(Characteristic::SerialNumber, serial);
    service
}
