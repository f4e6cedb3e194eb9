// SPDX-License-Identifier: GPL-3.0-only

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::CommandError;

/// Hard failures: the volume itself cannot be enumerated.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("volume path does not exist: {}", .0.display())]
    VolumeNotFound(PathBuf),

    #[error("volume path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("permission denied listing {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error listing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CollectError {
    pub(crate) fn from_listing(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => CollectError::VolumeNotFound(path),
            io::ErrorKind::NotADirectory => CollectError::NotADirectory(path),
            io::ErrorKind::PermissionDenied => CollectError::PermissionDenied(path),
            _ => CollectError::Io { path, source },
        }
    }
}

/// Why a single directory could not be measured.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("unparsable size output for {}: {output:?}", path.display())]
    Unparsable { path: PathBuf, output: String },
}
