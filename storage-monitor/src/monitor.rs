// SPDX-License-Identifier: GPL-3.0-only

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use storage_sys::usage::{UsageCollector, volume_usage};
use storage_types::{VolumeReport, bytes_to_pretty};

use crate::config::VolumeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub volumes: Vec<VolumeReport>,
    pub failures: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failures > 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.has_failures() { 1 } else { 0 }
    }
}

/// Collect every volume in order. A volume that cannot be collected is
/// recorded as failed and the run moves on.
pub async fn run_all(collector: &UsageCollector, volumes: &[VolumeConfig]) -> RunSummary {
    if volumes.is_empty() {
        tracing::warn!("no volumes configured to monitor");
    } else {
        tracing::info!("monitoring {} volume(s)", volumes.len());
    }

    let mut reports = Vec::with_capacity(volumes.len());
    let mut failures = 0;

    for volume in volumes {
        let report = check_volume(collector, volume).await;
        if report.error.is_some() {
            failures += 1;
        }
        reports.push(report);
    }

    tracing::info!(
        volumes = reports.len(),
        failures,
        "monitoring complete"
    );

    RunSummary {
        volumes: reports,
        failures,
    }
}

pub async fn check_volume(collector: &UsageCollector, volume: &VolumeConfig) -> VolumeReport {
    let name = volume.display_name();
    tracing::info!(volume = %name, path = %volume.path.display(), "checking volume");

    let capacity = match volume_usage(&volume.path) {
        Ok(capacity) => {
            tracing::info!(
                volume = %name,
                "volume usage: {:.1}% of {}",
                capacity.percent_used,
                bytes_to_pretty(capacity.total_bytes, false)
            );
            Some(capacity)
        }
        Err(error) => {
            tracing::warn!(volume = %name, %error, "could not read volume capacity");
            None
        }
    };

    let started = Instant::now();
    let collected = collector.collect(&volume.path).await;
    let elapsed_ms = started.elapsed().as_millis();

    let (records, error) = match collected {
        Ok(records) => {
            tracing::info!(
                volume = %name,
                directories = records.len(),
                elapsed_ms,
                "user usage calculation completed"
            );
            (records, None)
        }
        Err(error) => {
            tracing::error!(volume = %name, %error, "usage collection failed");
            (Vec::new(), Some(error.to_string()))
        }
    };

    VolumeReport {
        name,
        path: volume.path.clone(),
        capacity,
        records,
        error,
        collected_at: Utc::now(),
        elapsed_ms,
    }
}
