pub mod auth;
pub mod handlers;
mod routes;
pub use routes::build as build_router;

use std::net::SocketAddr;

use crate::state::AppState;
use anyhow::{Context, Result};

/// Serves the host surface until ctrl-c.
pub async fn serve(app_state: AppState, bind: SocketAddr) -> Result<()> {
    let listener =
        tokio::net::TcpListener::bind(bind).await.with_context(|| format!("bind {bind}"))?;
    tracing::info!(%bind, "host surface listening");
    axum::serve(listener, routes::build(app_state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
