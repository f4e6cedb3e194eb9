// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const DEFAULT_LOG_PREFIX: &str = "diskmon.log";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Install the global subscriber. The returned guard flushes the file
/// writer when dropped and must live until the process exits.
pub(crate) fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let Some(file) = config.file.as_deref() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    };

    match file_writer(file, config.keep_days) {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(false)
                .with_timer(tracing_subscriber::fmt::time::SystemTime);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            Some(guard)
        }
        Err(e) => {
            eprintln!("diskmon: failed to initialize file logging: {e:#}");
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
            None
        }
    }
}

fn file_writer(
    file: &Path,
    keep_days: Option<u64>,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let (dir, prefix) = split_log_path(file);

    if let Err(e) = fs::create_dir_all(&dir) {
        return Err(anyhow::anyhow!(
            "create log directory failed: {} ({})",
            dir.display(),
            e
        ));
    }

    let appender = match keep_days {
        Some(days) => {
            cleanup_old_logs(&dir, &prefix, days);
            tracing_appender::rolling::daily(&dir, &prefix)
        }
        None => tracing_appender::rolling::never(&dir, &prefix),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    Ok((writer, guard))
}

fn split_log_path(file: &Path) -> (PathBuf, OsString) {
    let dir = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = file
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_LOG_PREFIX));
    (dir, prefix)
}

fn cleanup_old_logs(dir: &Path, prefix: &OsString, keep_days: u64) {
    let cutoff = keep_days
        .checked_mul(SECS_PER_DAY)
        .and_then(|secs| SystemTime::now().checked_sub(Duration::from_secs(secs)));
    let Some(cutoff) = cutoff else { return };

    let prefix = prefix.to_string_lossy();

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        // Only touch files created by our rolling appender.
        if !file_name.to_string_lossy().starts_with(prefix.as_ref()) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }

        let _ = fs::remove_file(entry.path());
    }
}
