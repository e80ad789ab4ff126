use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Staged to the cluster before any script is submitted
    Input,
    /// Fetched back after the job completes
    Output,
}

/// One file to move between the submit host and the cluster.
/// Immutable once created.
#[derive(Debug, Clone)]
pub struct FileTransfer {
    local: PathBuf,
    remote: String,
    direction: Direction,
}

impl FileTransfer {
    pub fn input(local: impl Into<PathBuf>, remote: impl Into<String>) -> FileTransfer {
        FileTransfer {
            local: local.into(),
            remote: remote.into(),
            direction: Direction::Input,
        }
    }

    pub fn output(local: impl Into<PathBuf>, remote: impl Into<String>) -> FileTransfer {
        FileTransfer {
            local: local.into(),
            remote: remote.into(),
            direction: Direction::Output,
        }
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }
}
