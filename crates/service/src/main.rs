//! Commerce gate service entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use commerce_gate_config::{validate_config, ConfigLoader, GateConfig};
use commerce_gate_service::{build_router, AppState};
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Commerce gate service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML or JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured API server port
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(config: &GateConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config precedence: CLI flags over environment over file.
    let mut config = match &args.config {
        Some(path) => ConfigLoader::from_file_with_env(path, "COMMERCE_GATE")?,
        None => ConfigLoader::from_env()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    validate_config(&config)?;

    init_tracing(&config);

    info!("Starting commerce gate service");
    info!("  Environment: {:?}", config.environment);
    info!("  Bind address: {}", config.server.bind_addr());

    let state = AppState::shared();
    let app = build_router(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr: SocketAddr = config.server.bind_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Commerce gate listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
