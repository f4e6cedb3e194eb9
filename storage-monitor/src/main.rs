// SPDX-License-Identifier: GPL-3.0-only

//! diskmon - per-account disk usage for shared volumes
//!
//! Reads the volume list and tunables from a TOML file, collects usage for
//! each volume (quota subsystem first, `du` scans otherwise) and prints a
//! ranked table or JSON. Exits non-zero when any volume could not be
//! collected.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use storage_sys::usage::UsageCollector;

mod config;
mod logging;
mod monitor;
mod output;

use config::{Config, LoggingLevel, MaxWorkers, VolumeConfig};

#[derive(Debug, Parser)]
#[command(name = "diskmon")]
#[command(about = "Report how much space each account's directory uses on shared volumes")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, required_unless_present = "volume")]
    config: Option<PathBuf>,

    /// Volume to collect; repeatable, replaces the configured list
    #[arg(long)]
    volume: Vec<PathBuf>,

    /// Skip the quota subsystem and always scan
    #[arg(long)]
    no_quotas: bool,

    /// Cap on concurrent directory scans
    #[arg(long)]
    max_workers: Option<u32>,

    /// Per-directory scan timeout in seconds
    #[arg(long)]
    scan_timeout: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum)]
    log_level: Option<LoggingLevel>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if !self.volume.is_empty() {
            config.volumes = self
                .volume
                .iter()
                .cloned()
                .map(VolumeConfig::from_path)
                .collect();
        }
        if self.no_quotas {
            config.performance.use_quotas = false;
        }
        if let Some(max_workers) = self.max_workers {
            config.performance.max_workers = Some(MaxWorkers::Count(i64::from(max_workers)));
        }
        if let Some(scan_timeout) = self.scan_timeout {
            config.performance.scan_timeout_secs = scan_timeout;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let _log_guard = logging::init(&config.logging);

    tracing::info!("diskmon v{} started", env!("CARGO_PKG_VERSION"));

    if unsafe { libc::geteuid() } != 0 {
        tracing::warn!("not running as root; quota reports are likely unavailable");
    }

    let collector_config = config.collector_config();
    tracing::info!(
        use_quotas = collector_config.use_quotas,
        max_workers = ?collector_config.max_workers,
        scan_timeout_secs = collector_config.scan_timeout.as_secs(),
        "performance settings"
    );

    let collector = UsageCollector::new(collector_config);
    let summary = monitor::run_all(&collector, &config.volumes).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", output::render_summary(&summary));
    }

    Ok(ExitCode::from(summary.exit_code()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_or_volume_is_required() {
        assert!(Cli::try_parse_from(["diskmon"]).is_err());
        assert!(Cli::try_parse_from(["diskmon", "--volume", "/srv"]).is_ok());
    }

    #[test]
    fn overrides_replace_configured_values() {
        let cli = Cli::try_parse_from([
            "diskmon",
            "--volume",
            "/srv",
            "--no-quotas",
            "--max-workers",
            "3",
            "--scan-timeout",
            "45",
            "--log-level",
            "debug",
        ])
        .expect("parse");

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        let collector = config.collector_config();
        assert_eq!(config.volumes, vec![VolumeConfig::from_path("/srv".into())]);
        assert!(!collector.use_quotas);
        assert_eq!(collector.max_workers, Some(3));
        assert_eq!(collector.scan_timeout.as_secs(), 45);
        assert_eq!(config.logging.level, LoggingLevel::Debug);
    }
}
