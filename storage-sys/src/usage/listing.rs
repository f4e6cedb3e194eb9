// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Immediate subdirectories of `root`, sorted by path.
///
/// Symlinks to directories count as directories. Entries that vanish or
/// cannot be stat'ed while listing are skipped; only failure to open
/// `root` itself is an error.
pub fn list_subdirectories(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut directories = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(path = %root.display(), %error, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if fs::metadata(&path).is_ok_and(|metadata| metadata.is_dir()) {
            directories.push(path);
        }
    }

    directories.sort();
    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_directories_in_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(temp.path().join("bob")).expect("create bob");
        fs::create_dir(temp.path().join("alice")).expect("create alice");
        fs::write(temp.path().join("notes.txt"), b"x").expect("write file");

        let listed = list_subdirectories(temp.path()).expect("list");
        assert_eq!(
            listed,
            vec![temp.path().join("alice"), temp.path().join("bob")]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let error = list_subdirectories(&temp.path().join("nope")).expect_err("should fail");
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
