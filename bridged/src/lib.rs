pub mod config;
pub mod host;
pub mod http;
pub mod state;
pub mod telemetry;
pub mod wiring;

use crate::{config::Config, http::serve, telemetry::init_tracing, wiring::build_bridge};

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    init_tracing()?;
    tracing::info!(hub = %cfg.hub, bind = %cfg.bind, "starting bridge");
    let (mut bridge, app_state) = build_bridge(&cfg).await?;
    bridge.start().await?;
    tokio::select! {
        res = bridge.run() => res,
        res = serve(app_state, cfg.bind) => res,
    }
}
