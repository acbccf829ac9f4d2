//! Git source adapter implementation

use async_trait::async_trait;
use freeze_source::{Checkout, Refresh, SourceError, SourceRepo, SourceResult, WorkingCopy};
use freeze_util::Revision;
use std::path::Path;
use tracing::{debug, info};

use crate::process::GitCommand;

/// Calendar source backed by the `git` command line
#[derive(Debug, Clone, Default)]
pub struct GitSource;

impl GitSource {
    pub fn new() -> Self {
        Self
    }

    async fn resolve_revision(copy: &WorkingCopy, rev: &str) -> SourceResult<Option<Revision>> {
        let result = GitCommand::new(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{}^{{commit}}", rev))
            .in_dir(copy.root())
            .line()
            .await;

        match result {
            Ok(sha) => Ok(Some(Revision::new(sha))),
            Err(SourceError::Command { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SourceRepo for GitSource {
    async fn materialize(
        &self,
        uri: &str,
        checkout: &Checkout,
        destination: &Path,
    ) -> SourceResult<WorkingCopy> {
        let mut clone = GitCommand::new(["clone", "--quiet"]);
        if let Some(branch) = &checkout.branch {
            clone = clone.arg("--branch").arg(branch.as_str());
        }
        clone
            .arg("--")
            .arg(uri)
            .arg(destination.to_string_lossy())
            .output()
            .await?;

        let branch = match &checkout.branch {
            Some(branch) => branch.clone(),
            None => {
                GitCommand::new(["rev-parse", "--abbrev-ref", "HEAD"])
                    .in_dir(destination)
                    .line()
                    .await?
            }
        };
        let copy = WorkingCopy::new(destination, branch);

        if let Some(revision) = &checkout.revision {
            let resolved = Self::resolve_revision(&copy, revision.as_str())
                .await?
                .ok_or_else(|| SourceError::RevisionNotFound(revision.clone()))?;

            GitCommand::new(["-c", "advice.detachedHead=false", "checkout", "--quiet", "--detach"])
                .arg(resolved.as_str())
                .in_dir(copy.root())
                .output()
                .await?;
        }

        info!(
            uri = %uri,
            branch = %copy.branch(),
            destination = %destination.display(),
            "Cloned calendar source"
        );

        Ok(copy)
    }

    async fn open(&self, copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<u8>> {
        let full = copy.root().join(path);
        debug!(path = %full.display(), "Reading file from working copy");

        tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::FileNotFound(path.to_path_buf()),
            _ => SourceError::Io(e),
        })
    }

    async fn refresh(&self, copy: &WorkingCopy) -> SourceResult<Refresh> {
        let before = self.current_revision(copy).await?;

        GitCommand::new(["fetch", "--quiet", "origin"])
            .in_dir(copy.root())
            .output()
            .await?;

        GitCommand::new(["reset", "--quiet", "--hard"])
            .arg(format!("origin/{}", copy.branch()))
            .in_dir(copy.root())
            .output()
            .await?;

        let revision = self.current_revision(copy).await?;
        let changed = revision != before;
        debug!(revision = %revision, changed, "Refreshed working copy");

        Ok(Refresh { revision, changed })
    }

    async fn current_revision(&self, copy: &WorkingCopy) -> SourceResult<Revision> {
        let sha = GitCommand::new(["rev-parse", "HEAD"])
            .in_dir(copy.root())
            .line()
            .await?;
        Ok(Revision::new(sha))
    }

    async fn history(&self, copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<Revision>> {
        let stdout = GitCommand::new(["log", "--format=%H", "--"])
            .arg(path.to_string_lossy())
            .in_dir(copy.root())
            .output()
            .await?;

        // git log lists newest first
        let mut revisions: Vec<Revision> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Revision::from)
            .collect();
        revisions.reverse();
        Ok(revisions)
    }
}
