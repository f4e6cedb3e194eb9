// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storage_types::{UsageRecord, UsageSource, sort_by_size_desc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::scanner::DirectorySizer;

/// Upper bound on concurrent scans regardless of configuration.
pub const WORKER_CEILING: usize = 16;

/// One directory to measure and the account it is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub directory: PathBuf,
    pub account: String,
}

/// Pool size for `directories` scans.
///
/// Scans are dominated by child-process I/O, so one worker per directory
/// is used up to [`WORKER_CEILING`]. A positive `configured_max` lowers
/// the ceiling; zero or `None` leaves it alone.
pub fn worker_count(directories: usize, configured_max: Option<usize>) -> usize {
    let ceiling = configured_max
        .filter(|max| *max > 0)
        .map_or(WORKER_CEILING, |max| max.min(WORKER_CEILING));

    directories.clamp(1, ceiling)
}

/// Fans directory scans out over a bounded pool and collects every result.
#[derive(Clone)]
pub struct ScanScheduler {
    sizer: Arc<dyn DirectorySizer>,
    max_workers: Option<usize>,
    timeout: Duration,
}

impl ScanScheduler {
    pub fn new(
        sizer: Arc<dyn DirectorySizer>,
        max_workers: Option<usize>,
        timeout: Duration,
    ) -> Self {
        Self {
            sizer,
            max_workers,
            timeout,
        }
    }

    /// Measure every target; a failed scan yields a zero-sized `Error`
    /// record and never affects its siblings. Returns once all scans have
    /// finished, ranked largest first.
    pub async fn scan_all(&self, targets: Vec<ScanTarget>) -> Vec<UsageRecord> {
        let total = targets.len();
        let workers = worker_count(total, self.max_workers);
        tracing::info!(
            directories = total,
            workers,
            configured_max = ?self.max_workers,
            "calculating directory sizes"
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut set = JoinSet::new();
        let mut in_flight = HashMap::new();
        let mut records = Vec::with_capacity(total);

        for target in targets {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(error) => {
                    tracing::error!(path = %target.directory.display(), %error, "scan pool closed");
                    records.push(UsageRecord::failed(target.account, target.directory));
                    continue;
                }
            };

            let sizer = Arc::clone(&self.sizer);
            let timeout = self.timeout;
            let task_target = target.clone();
            let handle = set.spawn(async move {
                let _permit = permit;
                measure(sizer.as_ref(), task_target, timeout).await
            });
            in_flight.insert(handle.id(), target);
        }

        let mut completed = 0usize;
        while let Some(joined) = set.join_next_with_id().await {
            completed += 1;
            match joined {
                Ok((id, record)) => {
                    in_flight.remove(&id);
                    records.push(record);
                }
                Err(error) => {
                    if let Some(target) = in_flight.remove(&error.id()) {
                        tracing::error!(
                            path = %target.directory.display(),
                            %error,
                            "scan task aborted"
                        );
                        records.push(UsageRecord::failed(target.account, target.directory));
                    }
                }
            }

            if completed % 10 == 0 {
                tracing::debug!("progress: {completed}/{total} directories processed");
            }
        }

        sort_by_size_desc(&mut records);
        tracing::info!(directories = records.len(), "completed size calculation");
        records
    }
}

async fn measure(
    sizer: &dyn DirectorySizer,
    target: ScanTarget,
    timeout: Duration,
) -> UsageRecord {
    match sizer.size_of(&target.directory, timeout).await {
        Ok(bytes) => UsageRecord::new(target.account, target.directory, bytes, UsageSource::Scan),
        Err(error) => {
            tracing::warn!(
                path = %target.directory.display(),
                %error,
                "could not measure directory"
            );
            UsageRecord::failed(target.account, target.directory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_worker_per_directory_up_to_ceiling() {
        assert_eq!(worker_count(1, None), 1);
        assert_eq!(worker_count(5, None), 5);
        assert_eq!(worker_count(16, None), 16);
        assert_eq!(worker_count(40, None), 16);
    }

    #[test]
    fn configured_max_tightens_but_never_raises_ceiling() {
        assert_eq!(worker_count(10, Some(4)), 4);
        assert_eq!(worker_count(3, Some(4)), 3);
        assert_eq!(worker_count(40, Some(64)), 16);
    }

    #[test]
    fn non_positive_max_defers_to_ceiling() {
        assert_eq!(worker_count(20, Some(0)), 16);
    }

    #[test]
    fn never_below_one_worker() {
        assert_eq!(worker_count(0, None), 1);
        assert_eq!(worker_count(0, Some(4)), 1);
    }
}
