// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Write;

use storage_types::{VolumeReport, format_bytes};

use crate::monitor::RunSummary;

/// Console table for a whole run.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    for report in &summary.volumes {
        render_volume(&mut out, report);
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "volumes={} failures={}",
        summary.volumes.len(),
        summary.failures
    );
    out
}

fn render_volume(out: &mut String, report: &VolumeReport) {
    let _ = writeln!(out, "== {} ({})", report.name, report.path.display());

    if let Some(capacity) = report.capacity {
        let _ = writeln!(
            out,
            "capacity: {} used of {} ({:.1}%), {} free",
            format_bytes(capacity.used_bytes),
            format_bytes(capacity.total_bytes),
            capacity.percent_used,
            format_bytes(capacity.free_bytes)
        );
    }

    if let Some(error) = &report.error {
        let _ = writeln!(out, "error: {error}");
        return;
    }

    if report.records.is_empty() {
        let _ = writeln!(out, "  (no user directories)");
        return;
    }

    let source = report
        .data_source()
        .map(|source| source.as_str())
        .unwrap_or("-");
    let _ = writeln!(
        out,
        "data source: {source}, {} directories, {} total, {} ms",
        report.records.len(),
        format_bytes(report.total_record_bytes()),
        report.elapsed_ms
    );
    let _ = writeln!(out, "  {:<3} {:<16} {:>12} {:<6} DIRECTORY", "#", "ACCOUNT", "SIZE", "SOURCE");

    for (index, record) in report.records.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:<3} {:<16} {:>12} {:<6} {}",
            index + 1,
            record.account(),
            format_bytes(record.size_bytes()),
            record.source().as_str(),
            record.directory().display()
        );
    }

    let failed = report.failed_scans();
    if failed > 0 {
        let _ = writeln!(out, "  {failed} directories could not be measured");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;
    use storage_types::{UsageRecord, UsageSource, VolumeUsage};

    use super::*;

    #[test]
    fn renders_ranked_rows_and_failures() {
        let summary = RunSummary {
            volumes: vec![VolumeReport {
                name: "scratch".to_string(),
                path: PathBuf::from("/scratch"),
                capacity: None,
                records: vec![
                    UsageRecord::new("alice", "/scratch/alice", 2048, UsageSource::Scan),
                    UsageRecord::failed("bob", "/scratch/bob"),
                ],
                error: None,
                collected_at: Utc::now(),
                elapsed_ms: 12,
            }],
            failures: 0,
        };

        let text = render_summary(&summary);

        assert!(text.contains("== scratch (/scratch)"));
        assert!(text.contains("data source: scan, 2 directories, 2.0 KiB total"));
        assert!(text.contains("alice"));
        assert!(text.contains("2.0 KiB"));
        assert!(text.contains("1 directories could not be measured"));
        assert!(text.ends_with("volumes=1 failures=0\n"));
    }

    #[test]
    fn capacity_uses_binary_units() {
        let summary = RunSummary {
            volumes: vec![VolumeReport {
                name: "scratch".to_string(),
                path: PathBuf::from("/scratch"),
                capacity: Some(VolumeUsage::new(4u64 << 30, 1u64 << 30, 3u64 << 30)),
                records: Vec::new(),
                error: None,
                collected_at: Utc::now(),
                elapsed_ms: 0,
            }],
            failures: 0,
        };

        let text = render_summary(&summary);
        assert!(text.contains("capacity: 1.0 GiB used of 4.0 GiB (25.0%), 3.0 GiB free"));
    }

    #[test]
    fn failed_volume_shows_error_only() {
        let summary = RunSummary {
            volumes: vec![VolumeReport {
                name: "gone".to_string(),
                path: PathBuf::from("/gone"),
                capacity: None,
                records: Vec::new(),
                error: Some("volume path does not exist: /gone".to_string()),
                collected_at: Utc::now(),
                elapsed_ms: 0,
            }],
            failures: 1,
        };

        let text = render_summary(&summary);
        assert!(text.contains("error: volume path does not exist: /gone"));
        assert!(!text.contains("ACCOUNT"));
    }
}
