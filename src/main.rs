use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use levelwatch::{format_duration, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "levelwatch")]
#[command(about = "Samples a reservoir level and reports it to a monitoring server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identifier sent with every batch
    #[arg(long)]
    agent_id: Option<String>,

    /// How often to sample the sensor (e.g., "5m", "30s")
    #[arg(long)]
    sample_interval: Option<String>,

    /// How often to append the current level to the buffer
    #[arg(long)]
    buffer_interval: Option<String>,

    /// How often to send pending readings
    #[arg(long)]
    transmit_interval: Option<String>,

    /// Deadline for a single send
    #[arg(long)]
    transmit_timeout: Option<String>,

    /// Maximum pending readings before the oldest are dropped
    #[arg(long)]
    capacity: Option<usize>,

    /// Skip the final send on shutdown
    #[arg(long)]
    no_flush: bool,

    /// Log filter (e.g., "debug", "levelwatch_sdk=trace"); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            agent_id: self.agent_id.clone(),
            sample_interval: self.sample_interval.clone(),
            buffer_interval: self.buffer_interval.clone(),
            transmit_interval: self.transmit_interval.clone(),
            transmit_timeout: self.transmit_timeout.clone(),
            capacity: self.capacity,
            flush_on_shutdown: self.no_flush.then_some(false),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_level.as_deref())?;

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    rt.block_on(run(settings))
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Run the agent until a shutdown signal arrives
async fn run(settings: Settings) -> Result<()> {
    let agent = settings.build_agent()?;

    info!(
        "agent {} sampling every {}, buffering every {}, sending every {} (timeout {})",
        settings.agent_id,
        format_duration(settings.intervals.sample),
        format_duration(settings.intervals.buffer),
        format_duration(settings.intervals.transmit),
        format_duration(settings.intervals.transmit_timeout),
    );

    let handle = agent.start();

    shutdown_signal().await?;
    info!("shutdown requested, stopping loops");

    let stats = handle.shutdown().await?;
    info!(
        "sampled {} ({} failed), sent {} batches ({} failed), {} readings still pending",
        stats.samples_taken,
        stats.sample_failures,
        stats.batches_sent,
        stats.transmit_failures,
        stats.pending
    );

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
