use anyhow::Result;
use async_trait::async_trait;
use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::warn;

use crate::{
    hub_contract::{HubCommand, HubMessage, METHOD_DEVICES_STATUS},
    model::{Device, DeviceId, FanSpeed, Program},
};

pub type EventStream = Box<dyn Stream<Item = HubMessage> + Unpin + Send>;

#[async_trait]
pub trait HubClient: Send + Sync {
    /// Establishes the event subscription. Must complete before discovery.
    async fn subscribe(&self) -> Result<()>;

    async fn get_accessories(&self) -> Result<Vec<Device>>;

    async fn events(&self) -> Result<EventStream>;

    async fn send_command(&self, command: HubCommand) -> Result<()>;

    async fn send_status_change_command(&self, device: DeviceId, on: bool) -> Result<()> {
        self.send_command(HubCommand::Status { device, on }).await
    }

    async fn send_brightness_change_command(&self, device: DeviceId, brightness: u8) -> Result<()> {
        self.send_command(HubCommand::Brightness { device, brightness }).await
    }

    async fn send_trigger_basic_state_command(&self, device: DeviceId) -> Result<()> {
        self.send_command(HubCommand::TriggerBasicState { device }).await
    }

    async fn send_fan_speed_command(&self, device: DeviceId, speed: FanSpeed) -> Result<()> {
        self.send_command(HubCommand::FanSpeed { device, speed }).await
    }

    async fn send_position_change_command(&self, device: DeviceId, position: u8) -> Result<()> {
        self.send_command(HubCommand::Position { device, position }).await
    }

    async fn send_temp_overrule_command(
        &self,
        device: DeviceId,
        active: bool,
        setpoint: f64,
        duration_minutes: Option<u32>,
    ) -> Result<()> {
        self.send_command(HubCommand::TempOverrule { device, active, setpoint, duration_minutes })
            .await
    }

    async fn send_program_command(&self, device: DeviceId, program: Program) -> Result<()> {
        self.send_command(HubCommand::Program { device, program }).await
    }
}

/// Hub stand-in for tests and local runs. With `echo` each command comes back
/// as a `devices.status` event.
#[derive(Clone)]
pub struct InMemoryHub {
    devices: Arc<RwLock<Vec<Device>>>,
    tx: Arc<broadcast::Sender<HubMessage>>,
    commands: Arc<Mutex<Vec<HubCommand>>>,
    subscribed: Arc<AtomicBool>,
    echo: bool,
}

impl Default for InMemoryHub {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(1024);
        Self {
            devices: Arc::new(RwLock::new(Vec::new())),
            tx: Arc::new(tx),
            commands: Arc::new(Mutex::new(Vec::new())),
            subscribed: Arc::new(AtomicBool::new(false)),
            echo: false,
        }
    }
}

impl InMemoryHub {
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let hub = Self::default();
        *hub.devices.write().unwrap_or_else(|e| e.into_inner()) = devices;
        hub
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn push_event(&self, event: HubMessage) {
        let _ = self.tx.send(event);
    }

    pub fn commands(&self) -> Vec<HubCommand> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HubClient for InMemoryHub {
    async fn subscribe(&self) -> Result<()> {
        self.subscribed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get_accessories(&self) -> Result<Vec<Device>> {
        Ok(self.devices.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn events(&self) -> Result<EventStream> {
        let rx = self.tx.subscribe();
        let stream = BroadcastStream::new(rx).filter_map(|item| match item {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "in-memory hub event stream lagged");
                None
            }
        });
        Ok(Box::new(stream))
    }

    async fn send_command(&self, command: HubCommand) -> Result<()> {
        if self.echo {
            let device = Device {
                uuid: command.device(),
                properties: vec![command.properties()],
                ..Default::default()
            };
            self.push_event(HubMessage::new(METHOD_DEVICES_STATUS, vec![device]));
        }
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).push(command);
        Ok(())
    }
}
