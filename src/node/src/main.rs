//! Guidenet Node - Main Binary
//!
//! Hosts a guide reputation ledger:
//! - TOML configuration with policy thresholds and founding guides
//! - Serialized replay of JSON Lines operation scripts
//! - Structured logging of every notification
//! - Prometheus metrics dump

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use guidenet_node::{load_script, replay, NodeConfig};
use guidenet_reputation::{gather_text, get_registry, register_metrics, ReputationLedger, TracingSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Guidenet Node CLI
#[derive(Parser)]
#[command(name = "guidenet-node")]
#[command(about = "Guide reputation ledger host")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "GUIDENET_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay an operation script against a fresh ledger
    Replay {
        /// JSON Lines script, one operation per line
        #[arg(short, long)]
        script: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Load and validate the configuration
    CheckConfig,

    /// Show node version
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = NodeConfig::load_or_default(cli.config.as_deref())?;

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},guidenet_reputation={}", log_level, log_level).into()),
        )
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Version => {
            println!("Guidenet Node v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::CheckConfig => {
            config.validate()?;
            println!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
            Ok(())
        }
        Command::Replay { script, format } => run_replay(&config, &script, format),
    }
}

fn run_replay(config: &NodeConfig, script: &Path, format: ReportFormat) -> Result<()> {
    config.validate()?;

    let ops = load_script(script)?;
    info!("Loaded {} operations from {:?}", ops.len(), script);

    let mut ledger = ReputationLedger::with_config(config.reputation_config())
        .context("Failed to build ledger")?;
    if config.logging.log_events {
        ledger = ledger.with_sink(Arc::new(TracingSink));
    }
    if config.metrics.enabled {
        let metrics = register_metrics().context("Failed to register metrics")?;
        ledger = ledger.with_metrics(metrics);
    }

    let report = replay(&mut ledger, &ops);
    info!(
        "Replay finished: {} applied, {} rejected",
        report.applied, report.rejected
    );

    match format {
        ReportFormat::Text => print!("{}", report.to_text()),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    if config.metrics.enabled && config.metrics.print_on_exit {
        if let Some(registry) = get_registry() {
            print!("{}", gather_text(&registry).context("Failed to encode metrics")?);
        }
    }

    Ok(())
}
