// SPDX-License-Identifier: GPL-3.0-only

//! Data model shared by the usage collector and everything downstream of it.
//!
//! - **storage-sys**: produces [`UsageRecord`] lists, one per volume
//! - **storage-monitor**: wraps them into [`VolumeReport`]s for output
//!
//! A record list handed out by the collector is always ranked by size,
//! largest first, and carries its provenance in [`UsageSource`].

pub mod common;
pub mod report;
pub mod usage;

pub use common::{bytes_to_pretty, format_bytes};
pub use report::{VolumeReport, VolumeUsage};
pub use usage::{UsageRecord, UsageSource, sort_by_size_desc};
