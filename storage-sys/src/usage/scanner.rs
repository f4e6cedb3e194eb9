// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::ScanError;
use crate::command::{CommandRunner, SystemCommandRunner};

const DU: &str = "du";

/// Measures the bytes held by one directory subtree.
#[async_trait]
pub trait DirectorySizer: Send + Sync {
    async fn size_of(&self, path: &Path, timeout: Duration) -> Result<u64, ScanError>;
}

/// `du -s -b -x`: apparent size in bytes, staying on the directory's own
/// filesystem.
#[derive(Clone)]
pub struct DuScanner {
    runner: Arc<dyn CommandRunner>,
}

impl DuScanner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Default for DuScanner {
    fn default() -> Self {
        Self::new(Arc::new(SystemCommandRunner))
    }
}

#[async_trait]
impl DirectorySizer for DuScanner {
    async fn size_of(&self, path: &Path, timeout: Duration) -> Result<u64, ScanError> {
        let args = du_args(path);
        let output = self.runner.run(DU, &args, timeout).await?;

        parse_du_output(&output.stdout).ok_or_else(|| ScanError::Unparsable {
            path: path.to_path_buf(),
            output: output.stdout.trim().to_string(),
        })
    }
}

fn du_args(path: &Path) -> Vec<String> {
    vec![
        "-s".to_string(),
        "-b".to_string(),
        "-x".to_string(),
        "--".to_string(),
        path.to_string_lossy().into_owned(),
    ]
}

/// `du -s` prints `<bytes>\t<path>`.
fn parse_du_output(stdout: &str) -> Option<u64> {
    stdout.split_whitespace().next()?.parse().ok()
}
