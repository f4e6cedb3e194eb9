// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storage_sys::usage::CollectorConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LoggingLevel::Error => "error",
            LoggingLevel::Warn => "warn",
            LoggingLevel::Info => "info",
            LoggingLevel::Debug => "debug",
            LoggingLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LoggingLevel,
    /// Log file in addition to stdout.
    pub file: Option<PathBuf>,
    /// Roll the log file daily and delete files older than this.
    pub keep_days: Option<u64>,
}

/// `max_workers = 8` or `max_workers = "auto"`. Any other TOML value is
/// accepted and leaves the pool at its built-in ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxWorkers {
    Count(i64),
    Keyword(String),
    Other(toml::Value),
}

impl MaxWorkers {
    /// Only a positive count limits the pool.
    pub fn limit(&self) -> Option<usize> {
        match self {
            MaxWorkers::Count(count) if *count > 0 => usize::try_from(*count).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_workers: Option<MaxWorkers>,
    pub use_quotas: bool,
    #[serde(alias = "du_timeout")]
    pub scan_timeout_secs: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_workers: Some(MaxWorkers::Count(8)),
            use_quotas: true,
            scan_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub name: Option<String>,
    pub path: PathBuf,
}

impl VolumeConfig {
    pub fn from_path(path: PathBuf) -> Self {
        Self { name: None, path }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub volumes: Vec<VolumeConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.performance.scan_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "performance.scan_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(volume) = self
            .volumes
            .iter()
            .find(|volume| volume.path.as_os_str().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "volume '{}' has an empty path",
                volume.display_name()
            )));
        }

        Ok(())
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            use_quotas: self.performance.use_quotas,
            max_workers: self
                .performance
                .max_workers
                .as_ref()
                .and_then(MaxWorkers::limit),
            scan_timeout: Duration::from_secs(self.performance.scan_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config: Config = toml::from_str("").expect("empty config parses");
        let collector = config.collector_config();

        assert_eq!(config.logging.level, LoggingLevel::Info);
        assert!(collector.use_quotas);
        assert_eq!(collector.max_workers, Some(8));
        assert_eq!(collector.scan_timeout, Duration::from_secs(300));
        assert!(config.volumes.is_empty());
    }

    #[test]
    fn parses_full_configuration() {
        let raw = r#"
[logging]
level = "debug"
file = "/var/log/diskmon/diskmon.log"
keep_days = 3

[performance]
max_workers = 4
use_quotas = false
du_timeout = 60

[[volumes]]
name = "scratch"
path = "/scratch"

[[volumes]]
path = "/projects"
"#;
        let config: Config = toml::from_str(raw).expect("parse");
        config.validate().expect("valid");

        assert_eq!(config.logging.level, LoggingLevel::Debug);
        assert_eq!(config.logging.keep_days, Some(3));
        assert_eq!(
            config.collector_config(),
            CollectorConfig {
                use_quotas: false,
                max_workers: Some(4),
                scan_timeout: Duration::from_secs(60),
            }
        );
        assert_eq!(config.volumes[0].display_name(), "scratch");
        assert_eq!(config.volumes[1].display_name(), "/projects");
    }

    #[test]
    fn non_numeric_or_non_positive_max_workers_defer_to_ceiling() {
        let auto: Config =
            toml::from_str("[performance]\nmax_workers = \"auto\"\n").expect("parse auto");
        assert_eq!(auto.collector_config().max_workers, None);

        let zero: Config = toml::from_str("[performance]\nmax_workers = 0\n").expect("parse zero");
        assert_eq!(zero.collector_config().max_workers, None);

        let negative: Config =
            toml::from_str("[performance]\nmax_workers = -2\n").expect("parse negative");
        assert_eq!(negative.collector_config().max_workers, None);
    }

    #[test]
    fn other_max_worker_values_load_and_defer_to_ceiling() {
        for raw in [
            "[performance]\nmax_workers = true\n",
            "[performance]\nmax_workers = 4.5\n",
            "[performance]\nmax_workers = [2]\n",
        ] {
            let config: Config = toml::from_str(raw).expect("non-numeric max_workers parses");
            assert!(matches!(
                config.performance.max_workers,
                Some(MaxWorkers::Other(_))
            ));
            assert_eq!(config.collector_config().max_workers, None);
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let config: Config =
            toml::from_str("[performance]\nscan_timeout_secs = 0\n").expect("parse");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let result = Config::load(&temp.path().join("diskmon.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn loads_from_disk() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("diskmon.toml");
        fs::write(&path, "[[volumes]]\npath = \"/srv\"\n").expect("write config");

        let config = Config::load(&path).expect("load");
        assert_eq!(config.volumes, vec![VolumeConfig::from_path("/srv".into())]);
    }
}
