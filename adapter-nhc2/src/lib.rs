mod tls;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bridge_core::{
    client::{EventStream, HubClient},
    hub_contract::{
        HubCommand, HubError, HubMessage, METHOD_DEVICES_LIST, TOPIC_COMMAND, TOPIC_ERROR, TOPIC_EVENT,
        TOPIC_RESPONSE,
    },
    model::Device,
};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS, TlsConfiguration, Transport};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{debug, warn};

pub const DEFAULT_PORT: u16 = 8884;
pub const DEFAULT_CLIENT_ID: &str = "NHC2-homebridge";
pub const DEFAULT_USERNAME: &str = "hobby";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain MQTT, for local brokers.
    Disabled,
    /// Verify the hub against this PEM CA file.
    CaFile(PathBuf),
    /// Accept the hub's self-signed certificate.
    AcceptHubCertificate,
}

#[derive(Debug, Clone)]
pub struct Nhc2Options {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
    pub discovery_timeout: Duration,
}

impl Default for Nhc2Options {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            client_id: DEFAULT_CLIENT_ID.into(),
            username: DEFAULT_USERNAME.into(),
            password: String::new(),
            tls: TlsMode::AcceptHubCertificate,
            discovery_timeout: Duration::from_secs(10),
        }
    }
}

impl Nhc2Options {
    fn mqtt_options(&self) -> Result<MqttOptions> {
        let mut opts = MqttOptions::new(&self.client_id, &self.host, self.port);
        opts.set_keep_alive(Duration::from_secs(5));
        opts.set_clean_session(true);
        opts.set_credentials(&self.username, &self.password);
        match &self.tls {
            TlsMode::Disabled => {}
            TlsMode::CaFile(path) => {
                let ca = std::fs::read(path)
                    .with_context(|| format!("read hub CA file {}", path.display()))?;
                opts.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
                    ca,
                    alpn: None,
                    client_auth: None,
                }));
            }
            TlsMode::AcceptHubCertificate => {
                warn!(host = %self.host, "hub certificate is not verified");
                opts.set_transport(Transport::tls_with_config(TlsConfiguration::Rustls(
                    tls::accept_hub_certificate(),
                )));
            }
        }
        Ok(opts)
    }
}

/// `HubClient` over the NHC2 hobby API. Responses and events are fanned out to
/// broadcast channels by a background task driving the MQTT event loop.
#[derive(Clone)]
pub struct Nhc2Client {
    client: AsyncClient,
    responses: Arc<broadcast::Sender<HubMessage>>,
    events: Arc<broadcast::Sender<HubMessage>>,
    discovery_timeout: Duration,
}

impl Nhc2Client {
    pub async fn connect(options: &Nhc2Options) -> Result<Self> {
        let opts = options.mqtt_options()?;
        let (client, mut eventloop) = AsyncClient::new(opts, 10);

        let (responses, _rx) = broadcast::channel(64);
        let (events, _rx) = broadcast::channel(1024);
        let responses = Arc::new(responses);
        let events = Arc::new(events);
        let rsp_tx = Arc::clone(&responses);
        let evt_tx = Arc::clone(&events);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Incoming::Publish(p))) => {
                        route(&p.topic, &p.payload, &rsp_tx, &evt_tx);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("mqtt event loop error: {e}");
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                }
            }
        });

        Ok(Self { client, responses, events, discovery_timeout: options.discovery_timeout })
    }
}

fn route(
    topic: &str,
    payload: &[u8],
    responses: &broadcast::Sender<HubMessage>,
    events: &broadcast::Sender<HubMessage>,
) {
    if topic == TOPIC_ERROR {
        match serde_json::from_slice::<HubError>(payload) {
            Ok(err) => warn!(
                method = %err.method,
                code = ?err.err_code,
                message = ?err.err_message,
                "hub reported an error"
            ),
            Err(e) => warn!("bad hub error payload: {e}"),
        }
        return;
    }

    let target = match topic {
        TOPIC_RESPONSE => responses,
        TOPIC_EVENT => events,
        _ => return,
    };
    match HubMessage::decode(payload) {
        Ok(msg) => {
            debug!(topic, method = %msg.method, "hub message");
            let _ = target.send(msg);
        }
        Err(e) => warn!(topic, "bad hub payload: {e}"),
    }
}

#[async_trait]
impl HubClient for Nhc2Client {
    async fn subscribe(&self) -> Result<()> {
        for topic in [TOPIC_RESPONSE, TOPIC_EVENT, TOPIC_ERROR] {
            self.client
                .subscribe(topic, QoS::AtLeastOnce)
                .await
                .with_context(|| format!("subscribe {topic}"))?;
        }
        Ok(())
    }

    async fn get_accessories(&self) -> Result<Vec<Device>> {
        let mut rx = self.responses.subscribe();
        let request = HubMessage::list_request().encode()?;
        self.client
            .publish(TOPIC_COMMAND, QoS::AtLeastOnce, false, request)
            .await
            .context("publish devices.list request")?;

        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(msg) if msg.method == METHOD_DEVICES_LIST => return Ok(msg.into_devices()),
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => bail!("hub connection closed during discovery"),
                }
            }
        };
        tokio::time::timeout(self.discovery_timeout, wait)
            .await
            .context("timed out waiting for devices.list response")?
    }

    async fn events(&self) -> Result<EventStream> {
        let rx = self.events.subscribe();
        let stream = BroadcastStream::new(rx).filter_map(|item| match item {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "hub event stream lagged");
                None
            }
        });
        Ok(Box::new(stream))
    }

    async fn send_command(&self, command: HubCommand) -> Result<()> {
        let payload = HubMessage::from(&command).encode()?;
        self.client
            .publish(TOPIC_COMMAND, QoS::AtLeastOnce, false, payload)
            .await
            .context("publish devices.control command")?;
        Ok(())
    }
}
