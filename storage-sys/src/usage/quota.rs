// SPDX-License-Identifier: GPL-3.0-only

//! Quota subsystem probes.
//!
//! Both strategies are best effort: a missing tool, a non-zero exit, a
//! timeout or output that yields no usable rows all mean "try the next
//! source", never an error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use storage_types::{UsageRecord, UsageSource, sort_by_size_desc};

use super::listing::list_subdirectories;
use super::mounts::mount_point_of;
use super::owner::account_for;
use crate::command::{CommandRunner, render};
use crate::error::CommandError;

const REPQUOTA: &str = "repquota";
const QUOTA: &str = "quota";

pub const AGGREGATE_REPORT_TIMEOUT: Duration = Duration::from_secs(30);
pub const PER_ACCOUNT_TIMEOUT: Duration = Duration::from_secs(10);

/// Quota block counts are reported in 1 KiB units.
const BLOCK_SIZE: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaStrategy {
    /// One `repquota -u <mount>` call covering every account.
    AggregateReport,
    /// One `quota -u <account> -w` call per top-level directory.
    PerAccount,
}

impl QuotaStrategy {
    /// Order in which strategies are tried.
    pub const ORDER: [QuotaStrategy; 2] = [QuotaStrategy::AggregateReport, QuotaStrategy::PerAccount];

    pub fn as_str(self) -> &'static str {
        match self {
            QuotaStrategy::AggregateReport => "aggregate-report",
            QuotaStrategy::PerAccount => "per-account",
        }
    }
}

/// A parsed `repquota` data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRow {
    pub account: String,
    pub blocks_kib: u64,
}

#[derive(Clone)]
pub struct QuotaProbe {
    runner: Arc<dyn CommandRunner>,
}

impl QuotaProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Try each strategy in [`QuotaStrategy::ORDER`], returning the first
    /// non-empty result.
    pub async fn probe(&self, volume: &Path) -> Option<Vec<UsageRecord>> {
        for strategy in QuotaStrategy::ORDER {
            if let Some(records) = self.run_strategy(strategy, volume).await {
                tracing::info!(
                    strategy = strategy.as_str(),
                    accounts = records.len(),
                    "retrieved usage from disk quotas"
                );
                return Some(records);
            }
        }

        tracing::info!(path = %volume.display(), "disk quotas not available");
        None
    }

    pub async fn run_strategy(
        &self,
        strategy: QuotaStrategy,
        volume: &Path,
    ) -> Option<Vec<UsageRecord>> {
        match strategy {
            QuotaStrategy::AggregateReport => self.aggregate_report(volume).await,
            QuotaStrategy::PerAccount => self.per_account(volume).await,
        }
    }

    /// Usage for every account that has a same-named directory directly
    /// under `volume`, from one `repquota` report of its mount point.
    pub async fn aggregate_report(&self, volume: &Path) -> Option<Vec<UsageRecord>> {
        let mount_point = mount_point_of(volume);
        tracing::debug!(
            path = %volume.display(),
            mount_point = %mount_point.display(),
            "resolved mount point"
        );

        let args = vec!["-u".to_string(), mount_point.to_string_lossy().into_owned()];
        let output = match self.runner.run(REPQUOTA, &args, AGGREGATE_REPORT_TIMEOUT).await {
            Ok(output) => output,
            Err(error) => {
                tracing::debug!(command = %render(REPQUOTA, &args), %error, "repquota unavailable");
                return None;
            }
        };

        let mut records: Vec<UsageRecord> = parse_repquota(&output.stdout)
            .into_iter()
            .filter_map(|row| {
                let directory = volume.join(&row.account);
                directory.is_dir().then(|| {
                    UsageRecord::new(
                        row.account,
                        directory,
                        row.blocks_kib.saturating_mul(BLOCK_SIZE),
                        UsageSource::Quota,
                    )
                })
            })
            .collect();

        if records.is_empty() {
            tracing::debug!("repquota produced no rows matching directories");
            return None;
        }

        sort_by_size_desc(&mut records);
        Some(records)
    }

    /// Usage per top-level directory owner, one `quota` call each.
    pub async fn per_account(&self, volume: &Path) -> Option<Vec<UsageRecord>> {
        let directories = match list_subdirectories(volume) {
            Ok(directories) => directories,
            Err(error) => {
                tracing::debug!(path = %volume.display(), %error, "cannot list volume for quota queries");
                return None;
            }
        };

        let mount_point = mount_point_of(volume);
        let volume_str = volume.to_string_lossy();
        let mount_str = mount_point.to_string_lossy();

        let mut responded = false;
        let mut records = Vec::new();

        for directory in directories {
            let account = account_for(&directory);
            let args = vec!["-u".to_string(), account.clone(), "-w".to_string()];

            let output = match self.runner.run(QUOTA, &args, PER_ACCOUNT_TIMEOUT).await {
                Ok(output) => output,
                Err(CommandError::NotFound(program)) => {
                    tracing::debug!(%program, "quota tool not installed");
                    break;
                }
                Err(error) => {
                    tracing::debug!(command = %render(QUOTA, &args), %error, "quota query failed");
                    continue;
                }
            };

            if output.stdout.trim().is_empty() {
                continue;
            }
            responded = true;

            if let Some(blocks_kib) = parse_quota_usage(&output.stdout, &volume_str, &mount_str) {
                records.push(UsageRecord::new(
                    account,
                    directory,
                    blocks_kib.saturating_mul(BLOCK_SIZE),
                    UsageSource::Quota,
                ));
            }
        }

        if !responded || records.is_empty() {
            return None;
        }

        sort_by_size_desc(&mut records);
        Some(records)
    }
}

/// Data rows of a `repquota -u` report.
///
/// Rows start after the first dashed separator line. Rows whose usage
/// field is not a number are dropped individually.
pub fn parse_repquota(output: &str) -> Vec<QuotaRow> {
    let mut data_started = false;
    let mut rows = Vec::new();

    for line in output.lines() {
        if line.contains("------") {
            data_started = true;
            continue;
        }

        if !data_started {
            continue;
        }

        if let Some(row) = parse_repquota_row(line) {
            rows.push(row);
        }
    }

    rows
}

/// `alice     --  2097152       0       0     12     0     0`
fn parse_repquota_row(line: &str) -> Option<QuotaRow> {
    let mut fields = line.split_whitespace();

    // Long names have the two state markers glued on.
    let account = fields.next()?.trim_end_matches(['+', '-']);
    if !is_account_name(account) {
        return None;
    }

    let usage = fields.find(|field| !is_state_marker(field))?;
    let blocks_kib = usage.trim_matches(['+', '-', '*']).parse().ok()?;

    Some(QuotaRow {
        account: account.to_string(),
        blocks_kib,
    })
}

fn is_state_marker(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c == '+' || c == '-')
}

// `#1234` rows are uids without a passwd entry; path-like names can't map
// onto a single child directory.
fn is_account_name(account: &str) -> bool {
    !account.is_empty()
        && !account.starts_with('#')
        && !account.contains('/')
        && account != "."
        && account != ".."
}

/// Block usage from `quota -w` output.
///
/// Takes the first line mentioning either the volume path or its mount
/// point and whose second field is numeric. Substring matching can pick
/// the wrong line when one path is a prefix of another; the output format
/// differs between platforms, so the heuristic is kept as is.
pub fn parse_quota_usage(output: &str, volume: &str, mount_point: &str) -> Option<u64> {
    output
        .lines()
        .filter(|line| line.contains(volume) || line.contains(mount_point))
        .find_map(|line| {
            let usage = line.split_whitespace().nth(1)?;
            usage.replace('*', "").parse().ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
*** Report for user quotas on device /dev/sdb1
Block grace time: 7days; Inode grace time: 7days
                        Block limits                File limits
User            used    soft    hard  grace    used  soft  hard  grace
----------------------------------------------------------------------
root      --      20       0       0              2     0     0
alice     +-  2097152 1000000 2000000  6days     12     0     0
bob       --  garbage       0       0              3     0     0
#1001     --    4096       0       0              1     0     0
averyveryverylongname--     512       0       0              1     0     0
";

    #[test]
    fn parses_rows_after_separator() {
        let rows = parse_repquota(REPORT);
        assert_eq!(
            rows,
            vec![
                QuotaRow {
                    account: "root".to_string(),
                    blocks_kib: 20,
                },
                QuotaRow {
                    account: "alice".to_string(),
                    blocks_kib: 2_097_152,
                },
                QuotaRow {
                    account: "averyveryverylongname".to_string(),
                    blocks_kib: 512,
                },
            ]
        );
    }

    #[test]
    fn output_without_separator_has_no_rows() {
        assert!(parse_repquota("root -- 20 0 0\n").is_empty());
    }

    #[test]
    fn quota_usage_matches_mount_point_line() {
        let output = "\
Disk quotas for user alice (uid 1000):
     Filesystem  blocks   quota   limit   grace   files   quota   limit   grace
           /srv    1536*   1000    2000   6days      10       0       0
";
        assert_eq!(parse_quota_usage(output, "/srv/home", "/srv"), Some(1536));
    }

    #[test]
    fn quota_usage_skips_unparsable_matching_lines() {
        let output = "\
/srv/home is not quota-enabled
/srv/home 42 0 0 1 0 0
";
        assert_eq!(parse_quota_usage(output, "/srv/home", "/srv"), Some(42));
    }

    #[test]
    fn quota_usage_ignores_other_filesystems() {
        let output = "/data 99 0 0 1 0 0\n";
        assert_eq!(parse_quota_usage(output, "/srv/home", "/srv"), None);
    }
}
