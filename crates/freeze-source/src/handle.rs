//! Working copy handle

use freeze_util::Revision;
use std::path::{Path, PathBuf};

/// What to check out when materializing a working copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkout {
    /// Branch to track; the remote default branch when `None`
    pub branch: Option<String>,

    /// Pin the working copy to this revision instead of the branch tip
    pub revision: Option<Revision>,
}

impl Checkout {
    pub fn branch_tip(branch: Option<String>) -> Self {
        Self {
            branch,
            revision: None,
        }
    }

    pub fn at(branch: Option<String>, revision: Option<Revision>) -> Self {
        Self { branch, revision }
    }
}

/// Handle to a materialized working copy
///
/// Created by a [`SourceRepo`](crate::SourceRepo) and only meaningful to the
/// source that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    root: PathBuf,
    branch: String,
}

impl WorkingCopy {
    pub fn new(root: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            branch: branch.into(),
        }
    }

    /// Directory holding the checked out files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Branch whose tip `refresh` resets to
    pub fn branch(&self) -> &str {
        &self.branch
    }
}

/// Outcome of fetching and resetting to the remote branch tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    pub revision: Revision,
    /// Whether the working copy moved
    pub changed: bool,
}
