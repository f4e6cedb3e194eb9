// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use nix::unistd::{Uid, User};

/// Account name owning `path`, or `None` when the path cannot be stat'ed
/// or its uid has no passwd entry.
pub fn owner_of(path: &Path) -> Option<String> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not determine directory owner");
            return None;
        }
    };

    let name = username_for_uid(metadata.uid());
    if name.is_none() {
        tracing::debug!(path = %path.display(), uid = metadata.uid(), "owner uid has no account entry");
    }
    name
}

/// Owner of `path`, falling back to the directory's own name.
pub fn account_for(path: &Path) -> String {
    owner_of(path).unwrap_or_else(|| directory_name(path))
}

pub(crate) fn username_for_uid(uid: u32) -> Option<String> {
    User::from_uid(Uid::from_raw(uid))
        .ok()
        .flatten()
        .map(|user| user.name)
        .filter(|name| !name.is_empty())
}

pub(crate) fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_falls_back_to_its_name() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let gone = temp.path().join("erin");

        assert_eq!(owner_of(&gone), None);
        assert_eq!(account_for(&gone), "erin");
    }

    #[test]
    fn existing_directory_resolves_to_a_non_empty_account() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let account = account_for(temp.path());
        assert!(!account.is_empty());
    }

    #[test]
    fn root_uid_maps_to_an_account() {
        assert_eq!(username_for_uid(0).as_deref(), Some("root"));
    }
}
