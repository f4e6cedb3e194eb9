// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storage_types::UsageRecord;

use super::error::CollectError;
use super::listing::list_subdirectories;
use super::owner::account_for;
use super::quota::QuotaProbe;
use super::scanner::{DirectorySizer, DuScanner};
use super::scheduler::{ScanScheduler, ScanTarget};
use crate::command::{CommandRunner, SystemCommandRunner};

pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(300);

/// Tunables for one collector, supplied by the caller's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Consult the quota subsystem before scanning.
    pub use_quotas: bool,
    /// Cap on concurrent scans; `None` uses the built-in ceiling.
    pub max_workers: Option<usize>,
    /// Per-directory limit for one `du` run.
    pub scan_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            use_quotas: true,
            max_workers: None,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

/// Per-account usage for a volume: quota data when available, otherwise a
/// bounded parallel scan of every top-level directory.
#[derive(Clone)]
pub struct UsageCollector {
    config: CollectorConfig,
    quota: QuotaProbe,
    scheduler: ScanScheduler,
}

impl UsageCollector {
    /// Collector backed by the real `repquota`, `quota` and `du` tools.
    pub fn new(config: CollectorConfig) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        let sizer = Arc::new(DuScanner::new(Arc::clone(&runner)));
        Self::with_backends(config, runner, sizer)
    }

    pub fn with_backends(
        config: CollectorConfig,
        runner: Arc<dyn CommandRunner>,
        sizer: Arc<dyn DirectorySizer>,
    ) -> Self {
        let scheduler = ScanScheduler::new(sizer, config.max_workers, config.scan_timeout);
        Self {
            quota: QuotaProbe::new(runner),
            scheduler,
            config,
        }
    }

    /// Ranked usage records for the top-level directories of `volume`.
    ///
    /// Quota results are returned as-is and never mixed with scan results.
    /// Fails only when `volume` itself cannot be listed.
    pub async fn collect(&self, volume: &Path) -> Result<Vec<UsageRecord>, CollectError> {
        if !volume.exists() {
            return Err(CollectError::VolumeNotFound(volume.to_path_buf()));
        }

        if self.config.use_quotas {
            tracing::info!(path = %volume.display(), "attempting to get usage from disk quotas");
            if let Some(records) = self.quota.probe(volume).await {
                return Ok(records);
            }
        } else {
            tracing::debug!("quota usage disabled in configuration");
        }

        tracing::info!(path = %volume.display(), "falling back to directory scan");
        let directories = list_subdirectories(volume)
            .map_err(|error| CollectError::from_listing(volume.to_path_buf(), error))?;

        if directories.is_empty() {
            tracing::warn!(path = %volume.display(), "no directories found to process");
            return Ok(Vec::new());
        }

        let targets = directories
            .into_iter()
            .map(|directory| ScanTarget {
                account: account_for(&directory),
                directory,
            })
            .collect();

        Ok(self.scheduler.scan_all(targets).await)
    }
}
