//! Source capability trait

use async_trait::async_trait;
use freeze_util::Revision;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{Checkout, Refresh, WorkingCopy};

/// Errors from source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Revision {0} not found")]
    RevisionNotFound(Revision),

    #[error("File {0} not found in working copy")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Source adapter trait - implemented by transports that hold calendars
#[async_trait]
pub trait SourceRepo: Send + Sync {
    /// Create a working copy of `uri` in `destination`
    async fn materialize(
        &self,
        uri: &str,
        checkout: &Checkout,
        destination: &Path,
    ) -> SourceResult<WorkingCopy>;

    /// Read a file from the working copy
    async fn open(&self, copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<u8>>;

    /// Fetch the remote and hard-reset the working copy to its branch tip
    async fn refresh(&self, copy: &WorkingCopy) -> SourceResult<Refresh>;

    /// Revision the working copy is at
    async fn current_revision(&self, copy: &WorkingCopy) -> SourceResult<Revision>;

    /// Revisions that touched `path`, oldest first
    async fn history(&self, copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<Revision>>;
}
