//! nfs-status CLI - one health-check pass over the NFS share.
//!
//! Meant to be run periodically by cron or a systemd timer.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nfs_status::{EventLog, Monitor, MonitorConfig};

/// Probe the NFS share and fall back to local storage on failure.
#[derive(Parser, Debug)]
#[command(name = "nfs-status")]
#[command(about = "NFS share health monitor with fallback mount and email alerts")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long, env = "NFS_STATUS_CONFIG")]
    config: Option<PathBuf>,

    /// Echo every log line to the console
    #[arg(short, long)]
    debug: bool,

    /// Run modes; `debug` is equivalent to --debug
    #[arg(value_name = "MODE")]
    modes: Vec<String>,
}

impl Cli {
    fn debug_enabled(&self) -> bool {
        self.debug || self.modes.iter().any(|m| m == "debug")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let debug = cli.debug_enabled();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("nfs_status=debug")
        } else {
            EnvFilter::new("nfs_status=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli, debug).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, debug: bool) -> Result<ExitCode> {
    let config = MonitorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let log = EventLog::new(Some(config.log.path.clone()), debug);
    let monitor =
        Monitor::with_system_defaults(config, log).context("Failed to set up alert mailer")?;

    let status = monitor.run().await;
    tracing::debug!(?status, "Monitor finished");

    Ok(status.exit_code())
}
