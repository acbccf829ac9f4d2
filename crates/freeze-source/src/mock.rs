//! Mock source for testing

use async_trait::async_trait;
use freeze_util::Revision;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Checkout, Refresh, SourceError, SourceRepo, SourceResult, WorkingCopy};

const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone)]
struct MockCommit {
    revision: Revision,
    files: HashMap<PathBuf, Vec<u8>>,
}

#[derive(Debug, Default)]
struct MockState {
    /// Linear history of the single remote branch
    remote: Vec<MockCommit>,
    /// Index into `remote` the working copy is at
    checked_out: Option<usize>,
    refreshes: usize,
    fail_materialize: bool,
    fail_refresh: bool,
}

/// In-memory source with one linear branch and one working copy.
///
/// Commits land on the "remote" immediately but the working copy only
/// sees them after `refresh`, like a real clone. Clones share state, so a
/// test can keep a handle and push commits while the code under test polls.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commit `content` at `path` on the remote branch
    pub fn commit(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Revision {
        let mut state = self.state();
        let mut files = state
            .remote
            .last()
            .map(|c| c.files.clone())
            .unwrap_or_default();
        files.insert(path.into(), content.into());

        let revision = Revision::new(format!("{:040x}", state.remote.len() + 1));
        state.remote.push(MockCommit {
            revision: revision.clone(),
            files,
        });
        revision
    }

    /// Latest revision on the remote branch
    pub fn remote_head(&self) -> Option<Revision> {
        self.state().remote.last().map(|c| c.revision.clone())
    }

    /// How many times `refresh` was called
    pub fn refresh_count(&self) -> usize {
        self.state().refreshes
    }

    pub fn set_fail_materialize(&self, fail: bool) {
        self.state().fail_materialize = fail;
    }

    pub fn set_fail_refresh(&self, fail: bool) {
        self.state().fail_refresh = fail;
    }
}

fn checked_out(state: &MockState) -> SourceResult<&MockCommit> {
    state
        .checked_out
        .and_then(|idx| state.remote.get(idx))
        .ok_or_else(|| SourceError::Internal("No working copy materialized".into()))
}

#[async_trait]
impl SourceRepo for MockSource {
    async fn materialize(
        &self,
        uri: &str,
        checkout: &Checkout,
        destination: &Path,
    ) -> SourceResult<WorkingCopy> {
        let mut state = self.state();

        if state.fail_materialize || state.remote.is_empty() {
            return Err(SourceError::Command {
                command: format!("clone {}", uri),
                stderr: "Mock clone failure".into(),
            });
        }

        let idx = match &checkout.revision {
            Some(revision) => state
                .remote
                .iter()
                .position(|c| &c.revision == revision)
                .ok_or_else(|| SourceError::RevisionNotFound(revision.clone()))?,
            None => state.remote.len() - 1,
        };
        state.checked_out = Some(idx);

        let branch = checkout.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        Ok(WorkingCopy::new(destination, branch))
    }

    async fn open(&self, _copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<u8>> {
        let state = self.state();
        checked_out(&state)?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::FileNotFound(path.to_path_buf()))
    }

    async fn refresh(&self, _copy: &WorkingCopy) -> SourceResult<Refresh> {
        let mut state = self.state();
        state.refreshes += 1;

        if state.fail_refresh {
            return Err(SourceError::Command {
                command: "fetch origin".into(),
                stderr: "Mock fetch failure".into(),
            });
        }

        let before = state.checked_out;
        let tip = state.remote.len().saturating_sub(1);
        state.checked_out = Some(tip);

        Ok(Refresh {
            revision: checked_out(&state)?.revision.clone(),
            changed: before != Some(tip),
        })
    }

    async fn current_revision(&self, _copy: &WorkingCopy) -> SourceResult<Revision> {
        let state = self.state();
        Ok(checked_out(&state)?.revision.clone())
    }

    async fn history(&self, _copy: &WorkingCopy, path: &Path) -> SourceResult<Vec<Revision>> {
        let state = self.state();
        let upto = state.checked_out.map_or(0, |idx| idx + 1);

        let mut previous: Option<&Vec<u8>> = None;
        let mut revisions = Vec::new();
        for commit in &state.remote[..upto] {
            let content = commit.files.get(path);
            if content != previous {
                revisions.push(commit.revision.clone());
            }
            previous = content;
        }
        Ok(revisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy() -> WorkingCopy {
        WorkingCopy::new("/tmp/mock", DEFAULT_BRANCH)
    }

    #[tokio::test]
    async fn mock_materialize_and_open() {
        let source = MockSource::new();
        let rev = source.commit("calendar.yaml", "freeze_calendar: []");

        let wc = source
            .materialize("mock://repo", &Checkout::default(), Path::new("/tmp/mock"))
            .await
            .unwrap();

        assert_eq!(wc.branch(), "main");
        assert_eq!(source.current_revision(&wc).await.unwrap(), rev);
        assert_eq!(
            source.open(&wc, Path::new("calendar.yaml")).await.unwrap(),
            b"freeze_calendar: []".to_vec()
        );
        assert!(matches!(
            source.open(&wc, Path::new("other.yaml")).await,
            Err(SourceError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn mock_commits_visible_after_refresh() {
        let source = MockSource::new();
        let first = source.commit("calendar.yaml", "v1");
        source
            .materialize("mock://repo", &Checkout::default(), Path::new("/tmp/mock"))
            .await
            .unwrap();

        let unchanged = source.refresh(&copy()).await.unwrap();
        assert_eq!(unchanged, Refresh { revision: first, changed: false });

        let second = source.commit("calendar.yaml", "v2");
        assert_eq!(source.open(&copy(), Path::new("calendar.yaml")).await.unwrap(), b"v1");

        let moved = source.refresh(&copy()).await.unwrap();
        assert_eq!(moved, Refresh { revision: second, changed: true });
        assert_eq!(source.open(&copy(), Path::new("calendar.yaml")).await.unwrap(), b"v2");
        assert_eq!(source.refresh_count(), 2);
    }

    #[tokio::test]
    async fn mock_materialize_at_revision() {
        let source = MockSource::new();
        let first = source.commit("calendar.yaml", "v1");
        source.commit("calendar.yaml", "v2");

        let checkout = Checkout::at(None, Some(first.clone()));
        let wc = source
            .materialize("mock://repo", &checkout, Path::new("/tmp/mock"))
            .await
            .unwrap();
        assert_eq!(source.current_revision(&wc).await.unwrap(), first);

        let missing = Checkout::at(None, Some(Revision::new("nope")));
        assert!(matches!(
            source.materialize("mock://repo", &missing, Path::new("/tmp/mock")).await,
            Err(SourceError::RevisionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn mock_history_only_lists_changes_to_path() {
        let source = MockSource::new();
        let first = source.commit("calendar.yaml", "v1");
        source.commit("README.md", "docs");
        let third = source.commit("calendar.yaml", "v2");
        source
            .materialize("mock://repo", &Checkout::default(), Path::new("/tmp/mock"))
            .await
            .unwrap();

        let history = source.history(&copy(), Path::new("calendar.yaml")).await.unwrap();
        assert_eq!(history, vec![first, third]);
    }

    #[tokio::test]
    async fn mock_refresh_failure() {
        let source = MockSource::new();
        source.commit("calendar.yaml", "v1");
        source.set_fail_refresh(true);

        assert!(source.refresh(&copy()).await.is_err());
    }
}
