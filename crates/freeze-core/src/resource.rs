//! The resource verbs: check, get (`in`) and put (`out`)

use freeze_api::{
    CheckRequest, CheckResponse, GetRequest, PutRequest, Request, Source, Version,
    VersionResponse, METADATA_ACTIVE_WINDOWS, METADATA_TOTAL_WINDOWS,
};
use freeze_source::{Checkout, SourceRepo, WorkingCopy};
use freeze_util::{format_duration, Clock, Revision};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    effective_retry_interval, Cancellation, EvaluationRequest, GateLoop, ResourceError,
    ResourceResult,
};

/// A calendar source plus the clock and cancellation the verbs run with
pub struct Resource {
    source: Arc<dyn SourceRepo>,
    clock: Arc<dyn Clock>,
    cancel: Cancellation,
}

impl Resource {
    pub fn new(source: Arc<dyn SourceRepo>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            cancel: Cancellation::never(),
        }
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// List calendar revisions, oldest first, starting at the requested one
    pub async fn check(&self, request: &CheckRequest) -> ResourceResult<CheckResponse> {
        request.validate()?;

        let scratch = tempfile::Builder::new().prefix("freeze-check-").tempdir()?;
        let checkout = Checkout::branch_tip(request.source.branch.clone());
        let copy = self.materialize(&request.source, &checkout, scratch.path()).await?;

        let path = Path::new(&request.source.path);
        let history = self
            .source
            .history(&copy, path)
            .await
            .map_err(|e| ResourceError::source_failure(format!("list the history of {}", path.display()), e))?;

        debug!(revisions = history.len(), path = %path.display(), "Calendar history");

        Ok(select_versions(history, request.version.as_ref()))
    }

    /// Fetch the calendar into `destination` and apply the requested mode
    pub async fn get(&self, request: &GetRequest, destination: &Path) -> ResourceResult<VersionResponse> {
        request.validate()?;

        let params = &request.params;
        let evaluation_request = EvaluationRequest::new(params.scope.clone(), params.runway);
        let retry_interval = effective_retry_interval(params.retry_interval);
        if let Some(requested) = params.retry_interval
            && requested < retry_interval
        {
            debug!(
                requested = %format_duration(requested),
                using = %format_duration(retry_interval),
                "Retry interval raised to minimum"
            );
        }

        let checkout = Checkout::at(
            request.source.branch.clone(),
            request.version.as_ref().map(|v| v.sha.clone()),
        );
        let copy = self.materialize(&request.source, &checkout, destination).await?;
        let revision = self.current_revision(&copy).await?;

        info!(
            mode = %params.mode,
            revision = %revision.short(),
            scope = %evaluation_request.scope_label(),
            runway = %format_duration(params.runway),
            "Evaluating freeze calendar"
        );

        let gate = GateLoop {
            source: self.source.as_ref(),
            clock: self.clock.as_ref(),
            copy: &copy,
            calendar_path: Path::new(&request.source.path),
            mode: params.mode,
            request: &evaluation_request,
            retry_interval,
        };
        let outcome = gate.run(revision, &self.cancel).await?;

        Ok(VersionResponse::new(Version::from(outcome.revision))
            .with_metadata(METADATA_TOTAL_WINDOWS, outcome.evaluation.total)
            .with_metadata(METADATA_ACTIVE_WINDOWS, outcome.evaluation.active_count()))
    }

    /// Nothing to publish; echo the version back
    pub async fn put(&self, request: &PutRequest) -> ResourceResult<VersionResponse> {
        request.validate()?;
        info!("no-op");
        Ok(VersionResponse::new(request.version.clone().unwrap_or_default()))
    }

    async fn materialize(
        &self,
        source: &Source,
        checkout: &Checkout,
        destination: &Path,
    ) -> ResourceResult<WorkingCopy> {
        tokio::select! {
            biased;
            cause = self.cancel.cancelled() => Err(ResourceError::Cancelled {
                cause,
                phase: "cloning the calendar source",
            }),
            result = self.source.materialize(&source.uri, checkout, destination) => {
                result.map_err(|e| ResourceError::source_failure(format!("clone {}", source.uri), e))
            }
        }
    }

    async fn current_revision(&self, copy: &WorkingCopy) -> ResourceResult<Revision> {
        self.source
            .current_revision(copy)
            .await
            .map_err(|e| ResourceError::source_failure("determine the current revision", e))
    }
}

/// Pick the versions `check` reports from a path's history (oldest first).
///
/// A known version yields itself and everything newer. An unknown one
/// (e.g. force-pushed away) yields only the newest.
pub fn select_versions(history: Vec<Revision>, since: Option<&Version>) -> CheckResponse {
    let versions: Vec<Version> = history.into_iter().map(Version::from).collect();

    let Some(since) = since else {
        return versions;
    };

    match versions.iter().position(|v| v == since) {
        Some(idx) => versions[idx..].to_vec(),
        None => versions.last().cloned().into_iter().collect(),
    }
}
