//! Fake synthesis server - Main Entry Point
//!
//! Serves the synthesis gRPC service with a fixed-frequency backend so
//! clients can be exercised without a real synthesis flow.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use synthd_common::{ServerConfig, METRICS};
use synthd_server::SynthesisServer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fake_synthesis_server", version, about = "Synthesis server with a fixed-frequency backend")]
struct Args {
    /// Port to listen on, overriding the configured port (default 10000)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long = "bind_address")]
    bind_address: Option<String>,

    /// Maximum frequency reported for every design, in GHz
    #[arg(long = "max_frequency_ghz")]
    max_frequency_ghz: Option<f64>,

    /// Fail every compile request
    #[arg(long = "serve_errors")]
    serve_errors: bool,

    /// Optional YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind_address) = &self.bind_address {
            config.bind_address = bind_address.clone();
        }
        if let Some(ghz) = self.max_frequency_ghz {
            config.backend.max_frequency_hz = ghz * 1e9;
        }
        if self.serve_errors {
            config.backend.serve_errors = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);

    // Initialize logging
    let level = config.observability.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fake_synthesis_server={level},synthd_server={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting fake synthesis server: bind={}, max_frequency={}, serve_errors={}",
        config.listen_address(),
        config.backend.max_frequency(),
        config.backend.serve_errors
    );

    let server = SynthesisServer::fake(config).context("invalid server configuration")?;
    server.serve().await?;

    if let Ok(metrics) = METRICS.gather() {
        debug!("Final metrics:\n{}", metrics);
    }

    info!("Fake synthesis server shutdown complete");
    Ok(())
}
