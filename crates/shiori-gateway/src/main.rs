use std::path::PathBuf;

use clap::Parser;
use shiori_core::config::{AppConfig, UPSTREAM_ENV};
use shiori_gateway::{serve, shutdown_on};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Same-origin proxy for the anime catalog API.
#[derive(Parser, Debug)]
#[command(name = "shiori-gateway")]
struct Cli {
    /// Config file to use instead of the user config.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:3000.
    #[arg(long, env = "SHIORI_BIND")]
    bind: Option<String>,

    /// Upstream catalog API base URL.
    #[arg(long, env = UPSTREAM_ENV)]
    upstream: Option<String>,

    /// Path prefix to mount the proxy under.
    #[arg(long)]
    prefix: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiori=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::from_path(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load()?,
    };
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.gateway.upstream_base_url = upstream;
    }
    if let Some(prefix) = cli.prefix {
        config.gateway.prefix = prefix;
    }
    config.validate()?;

    serve(&config.gateway, shutdown_on(tokio::signal::ctrl_c())).await
}
