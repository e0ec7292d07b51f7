//! Synthesis client - Main Entry Point
//!
//! Sends one Verilog module to a synthesis server and prints the verdict.
//! Exits 0 when the server answered, 1 on any failure; on failure nothing is
//! written to stdout.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use synthd_client::{render, OutputFormat, SynthesisClient};
use synthd_common::{ClientConfig, Frequency};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "synthesis_client", version, about = "Send one compile request to a synthesis server")]
struct Args {
    /// Path to the Verilog source file
    verilog_path: PathBuf,

    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Requested clock frequency in GHz
    #[arg(long, default_value_t = 1.0, conflicts_with = "frequency")]
    ghz: f64,

    /// Requested clock frequency with units, e.g. 1.5GHz or 800MHz
    #[arg(long)]
    frequency: Option<Frequency>,

    /// Name of the top module
    #[arg(long)]
    top: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long = "timeout_secs")]
    timeout_secs: Option<u64>,

    /// Optional YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn target_frequency(&self) -> Frequency {
        self.frequency.unwrap_or_else(|| Frequency::from_ghz(self.ghz))
    }

    fn apply(&self, config: &mut ClientConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<String> {
    let module_text = tokio::fs::read_to_string(&args.verilog_path)
        .await
        .with_context(|| format!("reading {}", args.verilog_path.display()))?;

    let mut config = ClientConfig::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);

    let target = args.target_frequency();
    debug!("Requesting {} from {}", target, config.endpoint());

    let mut client = SynthesisClient::connect(&config).await?;
    let response = client
        .compile(module_text, args.top.as_deref(), target)
        .await?;

    Ok(render(&response, args.format)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the response
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synthesis_client=warn,synthd_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Compile request failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
