// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::sys::statvfs::statvfs;
use storage_types::VolumeUsage;

/// Mount point of the filesystem that `path` lives on.
///
/// Walks up from the absolute form of `path` until a directory sits on a
/// different device than its parent. The root always terminates the walk.
pub fn mount_point_of(path: &Path) -> PathBuf {
    let mut current = absolute_path(path);

    loop {
        let Some(parent) = current.parent().map(Path::to_path_buf) else {
            return current;
        };

        if is_mount_boundary(&current, &parent) {
            return current;
        }

        current = parent;
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn is_mount_boundary(directory: &Path, parent: &Path) -> bool {
    let (Ok(metadata), Ok(parent_metadata)) = (fs::metadata(directory), fs::metadata(parent))
    else {
        return false;
    };

    metadata.dev() != parent_metadata.dev() || metadata.ino() == parent_metadata.ino()
}

/// Capacity of the filesystem backing `path`, as `df` would report it.
pub fn volume_usage(path: &Path) -> io::Result<VolumeUsage> {
    let stats = statvfs(path).map_err(io::Error::from)?;
    let fragment = stats.fragment_size() as u64;

    let total = stats.blocks() as u64 * fragment;
    let used = (stats.blocks() as u64).saturating_sub(stats.blocks_free() as u64) * fragment;
    let free = stats.blocks_available() as u64 * fragment;

    Ok(VolumeUsage::new(total, used, free))
}
