use std::collections::BTreeMap;

use bridge_core::{
    error::FieldError,
    host::{Accessory, HostRuntime},
    model::{Device, DeviceId, Properties, PropertyFields},
};
use tracing::debug;

use crate::inbound;

struct Entry {
    accessory: Accessory,
    state: Properties,
}

/// The live accessory set, at most one per device uuid, together with each
/// device's current merged property state.
pub struct Reconciler {
    host: Box<dyn HostRuntime>,
    entries: BTreeMap<DeviceId, Entry>,
}

impl Reconciler {
    pub fn new(host: Box<dyn HostRuntime>) -> Self {
        Self { host, entries: BTreeMap::new() }
    }

    /// Registers `accessory`, unregistering any previous accessory with the
    /// same uuid first. Remembered property state is reset.
    pub fn upsert(&mut self, accessory: Accessory) {
        let uuid = accessory.uuid;
        if let Some(prior) = self.entries.remove(&uuid) {
            debug!(uuid = %uuid, name = %prior.accessory.name, "unregistering replaced accessory");
            self.host.unregister_accessories(std::slice::from_ref(&prior.accessory));
        }
        debug!(uuid = %uuid, name = %accessory.name, "registering accessory");
        self.host.register_accessories(std::slice::from_ref(&accessory));
        metrics::counter!("bridge.accessories.registered").increment(1);
        self.entries.insert(uuid, Entry { accessory, state: Properties::default() });
    }

    /// Seeds `accessory` with the properties of its discovery snapshot, then
    /// upserts it and keeps that snapshot as the device's current state.
    pub fn adopt(&mut self, device: &Device, mut accessory: Accessory) -> Vec<FieldError> {
        let state = device.merged_properties();
        let mut errors = Vec::new();
        for service in &mut accessory.services {
            errors.extend(inbound::apply_properties(&state, &device.properties, service));
        }
        self.upsert(accessory);
        if let Some(entry) = self.entries.get_mut(&device.uuid) {
            entry.state = state;
        }
        errors
    }

    pub fn find_by_device_uuid(&self, uuid: DeviceId) -> Option<&Accessory> {
        self.entries.get(&uuid).map(|e| &e.accessory)
    }

    /// Unregisters and drops the accessory of `uuid`, returning it.
    pub fn remove(&mut self, uuid: DeviceId) -> Option<Accessory> {
        let entry = self.entries.remove(&uuid)?;
        debug!(uuid = %uuid, name = %entry.accessory.name, "unregistering accessory");
        self.host.unregister_accessories(std::slice::from_ref(&entry.accessory));
        Some(entry.accessory)
    }

    /// Routes one device delta to its accessory. `None` when no accessory
    /// exists for the device; otherwise the field errors of the update.
    pub fn apply_device(&mut self, device: &Device) -> Option<Vec<FieldError>> {
        let entry = self.entries.get_mut(&device.uuid)?;
        let carried =
            device.properties.iter().fold(PropertyFields::empty(), |acc, p| acc | p.fields());
        if carried.is_empty() {
            debug!(uuid = %device.uuid, "delta carries no properties");
            return Some(Vec::new());
        }
        debug!(uuid = %device.uuid, fields = ?carried, "applying delta");
        for fragment in &device.properties {
            entry.state.merge(fragment);
        }
        let mut errors = Vec::new();
        for service in &mut entry.accessory.services {
            errors.extend(inbound::apply_properties(&entry.state, &device.properties, service));
        }
        Some(errors)
    }

    pub fn current_state(&self, uuid: DeviceId) -> Option<&Properties> {
        self.entries.get(&uuid).map(|e| &e.state)
    }

    pub fn accessories(&self) -> impl Iterator<Item = &Accessory> {
        self.entries.values().map(|e| &e.accessory)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
