use adapter_nhc2::{DEFAULT_PORT, Nhc2Options, TlsMode};
use anyhow::{Context, Result, anyhow, bail};
use bridge_core::model::DeviceId;
use constant_time_eq::constant_time_eq;
use dotenv::dotenv;
use percent_encoding::percent_decode_str;
use std::{
    fmt::{self, Display, Formatter},
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use url::Url;
use uuid::Uuid;

const PLAIN_MQTT_PORT: u16 = 1883;

#[derive(Clone, Debug, PartialEq)]
pub enum HubKind {
    InMem,
    Mqtt,
}

impl FromStr for HubKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inmem" => Ok(HubKind::InMem),
            "mqtt" => Ok(HubKind::Mqtt),
            _ => Err(()),
        }
    }
}

impl HubKind {
    fn as_str(&self) -> &'static str {
        match self {
            HubKind::InMem => "inmem",
            HubKind::Mqtt => "mqtt",
        }
    }
}

impl Display for HubKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthConfig {
    pub tokens: Vec<String>,
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.tokens.iter().any(|t| constant_time_eq(t.as_bytes(), candidate.as_bytes()))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: SocketAddr,
    pub hub: HubKind,
    pub nhc: Nhc2Options,
    pub suppressed: Vec<DeviceId>,
    pub fixture: Option<PathBuf>,
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            hub: HubKind::Mqtt,
            nhc: Nhc2Options::default(),
            suppressed: Vec::new(),
            fixture: None,
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut c = Self::default();
        if let Some(s) = var("BRIDGE_BIND") {
            c.bind = s.parse().with_context(|| format!("BRIDGE_BIND: {s}"))?;
        }
        if let Some(s) = var("BRIDGE_HUB") {
            c.hub = HubKind::from_str(&s).map_err(|_| anyhow!("BRIDGE_HUB: unknown hub {s}"))?;
        }
        if let Some(s) = var("BRIDGE_FIXTURE") {
            c.fixture = Some(PathBuf::from(s));
        }
        if let Some(s) = var("BRIDGE_API_TOKEN").filter(|s| !s.is_empty()) {
            c.auth.tokens = vec![s];
        }

        if let Some(conn) = var("NHC_URL") {
            apply_connection_string(&mut c.nhc, &conn)?;
        }
        if let Some(s) = var("NHC_HOST") {
            c.nhc.host = s;
        }
        if let Some(s) = var("NHC_PORT") {
            c.nhc.port = s.parse().with_context(|| format!("NHC_PORT: {s}"))?;
        }
        if let Some(s) = var("NHC_CLIENT_ID") {
            c.nhc.client_id = s;
        }
        if let Some(s) = var("NHC_USERNAME") {
            c.nhc.username = s;
        }
        if let Some(s) = var("NHC_PASSWORD") {
            c.nhc.password = s;
        }
        if let Some(s) = var("NHC_CA_FILE") {
            c.nhc.tls = TlsMode::CaFile(PathBuf::from(s));
        }
        if let Some(s) = var("NHC_TLS") {
            let enabled: bool = s.to_lowercase().parse().with_context(|| format!("NHC_TLS: {s}"))?;
            if !enabled {
                c.nhc.tls = TlsMode::Disabled;
            }
        }
        if let Some(s) = var("NHC_DISCOVERY_TIMEOUT_SECS") {
            let secs: u64 = s.parse().with_context(|| format!("NHC_DISCOVERY_TIMEOUT_SECS: {s}"))?;
            c.nhc.discovery_timeout = Duration::from_secs(secs);
        }
        if let Some(s) = var("NHC_SUPPRESSED") {
            c.suppressed = parse_suppressed(&s)?;
        }
        Ok(c)
    }
}

fn apply_connection_string(nhc: &mut Nhc2Options, conn: &str) -> Result<()> {
    let url = Url::parse(conn)?;
    let default_port = match url.scheme() {
        "mqtts" => DEFAULT_PORT,
        "mqtt" => {
            nhc.tls = TlsMode::Disabled;
            PLAIN_MQTT_PORT
        }
        other => bail!("unsupported hub url scheme: {other}"),
    };

    nhc.host = url.host_str().ok_or_else(|| anyhow!("hub url missing host"))?.to_string();
    nhc.port = url.port().unwrap_or(default_port);
    if !url.username().is_empty() {
        nhc.username = decoded(url.username(), "username")?;
    }
    if let Some(password) = url.password() {
        nhc.password = decoded(password, "password")?;
    }
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "client_id") {
        nhc.client_id = v.into_owned();
    }
    Ok(())
}

// Url hands back userinfo still percent-encoded.
fn decoded(raw: &str, what: &str) -> Result<String> {
    let text = percent_decode_str(raw)
        .decode_utf8()
        .with_context(|| format!("hub url {what} is not valid utf-8"))?;
    Ok(text.into_owned())
}

fn parse_suppressed(list: &str) -> Result<Vec<DeviceId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::try_parse(s).map(DeviceId).with_context(|| format!("NHC_SUPPRESSED: bad uuid {s}"))
        })
        .collect()
}
