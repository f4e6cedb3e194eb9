// SPDX-License-Identifier: GPL-3.0-only

pub mod collector;
pub mod error;
pub mod listing;
pub mod mounts;
pub mod owner;
pub mod quota;
pub mod scanner;
pub mod scheduler;

pub use collector::{CollectorConfig, DEFAULT_SCAN_TIMEOUT, UsageCollector};
pub use error::{CollectError, ScanError};
pub use listing::list_subdirectories;
pub use mounts::{mount_point_of, volume_usage};
pub use owner::{account_for, owner_of};
pub use quota::{QuotaProbe, QuotaRow, QuotaStrategy, parse_quota_usage, parse_repquota};
pub use scanner::{DirectorySizer, DuScanner};
pub use scheduler::{ScanScheduler, ScanTarget, WORKER_CEILING, worker_count};
