use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bridge_core::{
    client::{EventStream, HubClient},
    error::{FieldError, WriteError},
    host::{Accessory, HostRuntime, WriteIntent},
    hub_contract::{HubMessage, METHOD_DEVICES_ADDED, METHOD_DEVICES_REMOVED},
    model::{Device, DeviceId},
};
use metrics::counter;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::{classifier::Classifier, outbound, reconciler::Reconciler};

const REQUEST_CAPACITY: usize = 64;

/// A request from the host side, answered by the bridge task in order with
/// the hub events.
#[derive(Debug)]
pub enum HostRequest {
    List(oneshot::Sender<Vec<Accessory>>),
    Get(DeviceId, oneshot::Sender<Option<Accessory>>),
    Write(WriteIntent, WriteReply),
}

pub type WriteReply = oneshot::Sender<Result<(), WriteError>>;

#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<HostRequest>,
}

impl BridgeHandle {
    pub async fn accessories(&self) -> Result<Vec<Accessory>, WriteError> {
        let (reply, rx) = oneshot::channel();
        self.request(HostRequest::List(reply)).await?;
        rx.await.map_err(|_| WriteError::Unavailable)
    }

    pub async fn accessory(&self, uuid: DeviceId) -> Result<Option<Accessory>, WriteError> {
        let (reply, rx) = oneshot::channel();
        self.request(HostRequest::Get(uuid, reply)).await?;
        rx.await.map_err(|_| WriteError::Unavailable)
    }

    /// Resolves once the hub command has been issued, without waiting for
    /// the echoed state.
    pub async fn write(&self, intent: WriteIntent) -> Result<(), WriteError> {
        let (reply, rx) = oneshot::channel();
        self.request(HostRequest::Write(intent, reply)).await?;
        rx.await.map_err(|_| WriteError::Unavailable)?
    }

    async fn request(&self, request: HostRequest) -> Result<(), WriteError> {
        self.tx.send(request).await.map_err(|_| WriteError::Unavailable)
    }
}

/// Single consumer of hub events and host requests. Owns the registry; nothing
/// else mutates accessory state.
pub struct Bridge {
    client: Arc<dyn HubClient>,
    classifier: Classifier,
    reconciler: Reconciler,
    requests: mpsc::Receiver<HostRequest>,
    events: Option<EventStream>,
}

impl Bridge {
    pub fn new(
        client: Arc<dyn HubClient>,
        classifier: Classifier,
        host: Box<dyn HostRuntime>,
    ) -> (Self, BridgeHandle) {
        let (tx, requests) = mpsc::channel(REQUEST_CAPACITY);
        let bridge =
            Self { client, classifier, reconciler: Reconciler::new(host), requests, events: None };
        (bridge, BridgeHandle { tx })
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Subscribes, then registers an accessory for every discovered device.
    /// The event stream is opened before discovery so no delta is lost in
    /// between.
    pub async fn start(&mut self) -> Result<()> {
        for uuid in self.classifier.suppressed() {
            info!(uuid = %uuid, "suppressed device");
        }
        self.client.subscribe().await.context("subscribe to hub events")?;
        self.events = Some(self.client.events().await.context("open hub event stream")?);

        let devices = self.client.get_accessories().await.context("discover hub devices")?;
        info!(devices = devices.len(), "discovered hub devices");
        self.add_devices(&devices);
        info!(accessories = self.reconciler.len(), "accessories registered");
        Ok(())
    }

    pub fn add_devices(&mut self, devices: &[Device]) {
        for device in devices {
            let Some(accessory) = self.classifier.build_accessory(device) else {
                debug!(
                    uuid = %device.uuid,
                    model = %device.model,
                    kind = %device.device_type,
                    "no accessory for device"
                );
                continue;
            };
            let errors = self.reconciler.adopt(device, accessory);
            report_field_errors(device.uuid, &errors);
        }
    }

    pub fn process_event(&mut self, event: &HubMessage) {
        debug!(method = %event.method, "hub event");
        match event.method.as_str() {
            METHOD_DEVICES_ADDED => {
                let devices: Vec<Device> = event.devices().cloned().collect();
                self.add_devices(&devices);
            }
            METHOD_DEVICES_REMOVED => {
                for device in event.devices() {
                    if self.reconciler.remove(device.uuid).is_none() {
                        counter!("bridge.events.unmatched").increment(1);
                    }
                }
            }
            _ => {
                for device in event.devices() {
                    match self.reconciler.apply_device(device) {
                        Some(errors) => report_field_errors(device.uuid, &errors),
                        None => {
                            counter!("bridge.events.unmatched").increment(1);
                            debug!(uuid = %device.uuid, "event for unknown device dropped");
                        }
                    }
                }
            }
        }
    }

    pub async fn handle_write(&mut self, intent: WriteIntent) -> Result<(), WriteError> {
        let accessory = self
            .reconciler
            .find_by_device_uuid(intent.accessory)
            .ok_or(WriteError::UnknownAccessory(intent.accessory))?;
        let (service, handler) = accessory
            .writable(intent.characteristic)
            .ok_or(WriteError::NotWritable(intent.characteristic))?;
        let command = outbound::command_for(handler, intent.accessory, &intent.value, service)?;

        debug!(uuid = %intent.accessory, ?command, "sending hub command");
        match self.client.send_command(command).await {
            Ok(()) => {
                counter!("bridge.commands.sent").increment(1);
                Ok(())
            }
            Err(err) => {
                counter!("bridge.commands.failed").increment(1);
                warn!(uuid = %intent.accessory, error = %err, "hub command failed");
                Err(WriteError::Send(err))
            }
        }
    }

    // Answers reads in place; writes are handed back to be awaited.
    fn handle_request(&self, request: HostRequest) -> Option<(WriteIntent, WriteReply)> {
        match request {
            HostRequest::List(reply) => {
                let _ = reply.send(self.reconciler.accessories().cloned().collect());
                None
            }
            HostRequest::Get(uuid, reply) => {
                let _ = reply.send(self.reconciler.find_by_device_uuid(uuid).cloned());
                None
            }
            HostRequest::Write(intent, reply) => Some((intent, reply)),
        }
    }

    /// Drains hub events and host requests one at a time until the event
    /// stream ends. Runs `start` first if it has not been called.
    pub async fn run(mut self) -> Result<()> {
        if self.events.is_none() {
            self.start().await?;
        }
        let Some(mut events) = self.events.take() else {
            bail!("hub event stream unavailable");
        };
        let mut host_open = true;

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => self.process_event(&event),
                    None => bail!("hub event stream ended"),
                },
                request = self.requests.recv(), if host_open => match request {
                    Some(request) => {
                        if let Some((intent, reply)) = self.handle_request(request) {
                            let _ = reply.send(self.handle_write(intent).await);
                        }
                    }
                    None => host_open = false,
                },
            }
        }
    }
}

fn report_field_errors(uuid: DeviceId, errors: &[FieldError]) {
    for err in errors {
        counter!("bridge.fields.invalid").increment(1);
        warn!(uuid = %uuid, error = %err, "property field not applied");
    }
}
