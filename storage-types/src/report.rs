// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usage::{UsageRecord, UsageSource};

/// Capacity statistics of the filesystem backing a volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,

    /// Usage percentage (0-100)
    pub percent_used: f64,
}

impl VolumeUsage {
    pub fn new(total_bytes: u64, used_bytes: u64, free_bytes: u64) -> Self {
        let percent_used = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 * 100.0) / total_bytes as f64
        };

        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            percent_used,
        }
    }
}

/// Result of collecting one configured volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeReport {
    pub name: String,
    pub path: PathBuf,
    pub capacity: Option<VolumeUsage>,
    pub records: Vec<UsageRecord>,

    /// Set when collection for this volume failed outright.
    pub error: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub elapsed_ms: u128,
}

impl VolumeReport {
    /// Provenance of the batch as a whole: `Quota` when the quota subsystem
    /// answered, otherwise `Scan`. `None` for an empty batch.
    pub fn data_source(&self) -> Option<UsageSource> {
        let first = self.records.first()?;
        if first.source() == UsageSource::Quota {
            Some(UsageSource::Quota)
        } else {
            Some(UsageSource::Scan)
        }
    }

    pub fn total_record_bytes(&self) -> u64 {
        self.records.iter().map(UsageRecord::size_bytes).sum()
    }

    pub fn failed_scans(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.source() == UsageSource::Error)
            .count()
    }
}
