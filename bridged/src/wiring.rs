use std::{path::Path, sync::Arc};

use adapter_nhc2::Nhc2Client;
use anyhow::{Context, Result};
use bridge_core::{
    client::{HubClient, InMemoryHub},
    model::Device,
};
use bridge_engine::{classifier::Classifier, runtime::Bridge};

use crate::{
    config::{Config, HubKind},
    host::LoggingHost,
    state::AppState,
};

pub async fn build_client(cfg: &Config) -> Result<Arc<dyn HubClient>> {
    let client: Arc<dyn HubClient> = match cfg.hub {
        HubKind::InMem => {
            let devices = match &cfg.fixture {
                Some(path) => load_fixture(path)?,
                None => Vec::new(),
            };
            Arc::new(InMemoryHub::with_devices(devices).with_echo(true))
        }
        HubKind::Mqtt => Arc::new(
            Nhc2Client::connect(&cfg.nhc)
                .await
                .with_context(|| format!("connect to hub at {}:{}", cfg.nhc.host, cfg.nhc.port))?,
        ),
    };
    Ok(client)
}

pub async fn build_bridge(cfg: &Config) -> Result<(Bridge, AppState)> {
    let client = build_client(cfg).await?;
    let classifier = Classifier::new(cfg.suppressed.iter().copied());
    let (bridge, handle) = Bridge::new(client, classifier, Box::new(LoggingHost));
    Ok((bridge, AppState { bridge: handle, auth: cfg.auth.clone() }))
}

fn load_fixture(path: &Path) -> Result<Vec<Device>> {
    let raw = std::fs::read(path).with_context(|| format!("read fixture {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parse fixture {}", path.display()))
}
