// SPDX-License-Identifier: GPL-3.0-only

//! Per-account storage usage collection
//!
//! Answers "how many bytes does each top-level directory of this volume
//! hold, and who owns it" using the cheapest source that works:
//! - the quota subsystem (`repquota`, then per-account `quota`)
//! - a bounded pool of `du` scans when quotas are unavailable
//!
//! Quota tools are usually only useful with elevated privileges; their
//! absence is the normal case and is never reported as an error.

pub mod command;
pub mod error;
pub mod usage;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use error::{CommandError, Result};
pub use usage::{
    CollectError, CollectorConfig, DirectorySizer, DuScanner, QuotaProbe, ScanError,
    UsageCollector,
};
