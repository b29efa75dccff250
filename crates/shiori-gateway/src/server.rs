use std::future::Future;
use std::io;
use std::net::SocketAddr;

use anyhow::Context;
use shiori_core::config::GatewayConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::proxy::{router, GatewayState};

/// Bind `config.bind` and serve the proxy until `shutdown` resolves.
pub async fn serve<S>(config: &GatewayConfig, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    serve_on(listener, config, shutdown).await
}

/// Serve on an already bound listener. Tests bind port 0 and read the
/// address back before calling this.
pub async fn serve_on<S>(
    listener: TcpListener,
    config: &GatewayConfig,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let state = GatewayState::new(config).context("failed to build HTTP client")?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(
        %addr,
        prefix = config.prefix(),
        upstream = %config.upstream_base_url,
        "shiori gateway listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("shiori gateway stopped");
    Ok(())
}

/// Resolve once `signal` fires. If the signal handler could not be
/// installed, log it and never resolve, so the server keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to install shutdown signal handler");
            std::future::pending::<()>().await;
        }
    }
}
