// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a measurement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Reported by the filesystem quota subsystem.
    Quota,
    /// Measured by walking the directory tree.
    Scan,
    /// The scan for this directory failed; the size is a placeholder zero.
    Error,
}

impl UsageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageSource::Quota => "quota",
            UsageSource::Scan => "scan",
            UsageSource::Error => "error",
        }
    }
}

/// Bytes consumed by one account's top-level directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    account: String,
    directory: PathBuf,
    size_bytes: u64,
    source: UsageSource,
}

impl UsageRecord {
    /// Build a record. An empty `account` is replaced by the directory's
    /// base name so the account is never blank.
    pub fn new(
        account: impl Into<String>,
        directory: impl Into<PathBuf>,
        size_bytes: u64,
        source: UsageSource,
    ) -> Self {
        let directory = directory.into();
        let mut account = account.into();
        if account.is_empty() {
            account = fallback_account(&directory);
        }

        Self {
            account,
            directory,
            size_bytes,
            source,
        }
    }

    /// Placeholder for a directory that could not be measured.
    pub fn failed(account: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self::new(account, directory, 0, UsageSource::Error)
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn source(&self) -> UsageSource {
        self.source
    }
}

fn fallback_account(directory: &Path) -> String {
    directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| directory.to_string_lossy().into_owned())
}

/// Rank records largest first. Ties keep their relative order.
pub fn sort_by_size_desc(records: &mut [UsageRecord]) {
    records.sort_by(|left, right| right.size_bytes.cmp(&left.size_bytes));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_account_falls_back_to_directory_name() {
        let record = UsageRecord::new("", "/home/carol", 5, UsageSource::Scan);
        assert_eq!(record.account(), "carol");
    }

    #[test]
    fn failed_record_is_zero_sized_error() {
        let record = UsageRecord::failed("dave", "/home/dave");
        assert_eq!(record.size_bytes(), 0);
        assert_eq!(record.source(), UsageSource::Error);
    }

    #[test]
    fn sorts_descending_and_keeps_ties_stable() {
        let mut records = vec![
            UsageRecord::new("a", "/v/a", 10, UsageSource::Scan),
            UsageRecord::new("b", "/v/b", 30, UsageSource::Scan),
            UsageRecord::new("c", "/v/c", 10, UsageSource::Scan),
            UsageRecord::new("d", "/v/d", 20, UsageSource::Scan),
        ];

        sort_by_size_desc(&mut records);

        let order: Vec<&str> = records.iter().map(UsageRecord::account).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&UsageSource::Quota).expect("serialize source");
        assert_eq!(json, "\"quota\"");
    }
}
