//! Serve loop for the REST API.

use crate::routes::{build_router, cors_layer, SharedService};
use anyhow::Result;
use log::{info, warn};
use std::net::SocketAddr;

/// Listener settings for [`run_serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
    pub cors_origin: String,
}

/// Serves the API until Ctrl+C.
pub async fn run_serve(service: SharedService, options: &ServeOptions) -> Result<()> {
    let app = build_router(service, cors_layer(&options.cors_origin)?);
    let addr: SocketAddr = format!("{}:{}", options.bind, options.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=http_serve module=http status=start addr={addr} cors_origin={}",
        options.cors_origin
    );
    println!("leaflog serve listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=http_serve module=http status=ok addr={addr}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=http_serve module=http status=error error_code=signal_install_failed error={err}");
    }
}
