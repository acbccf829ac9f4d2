//! Gate loop
//!
//! Evaluating -> (clear) Done
//! Evaluating -> (active, gate) Blocked -> Refreshing -> Evaluating
//! Evaluating -> (active, fuse) Failed
//!
//! Blocked and Refreshing race against external cancellation. The calendar
//! is read again from the working copy on every evaluation, so changes
//! pulled in by a refresh take effect on the next pass.

use freeze_api::Mode;
use freeze_calendar::{parse_calendar, Calendar, CalendarFormat};
use freeze_source::{SourceRepo, WorkingCopy};
use freeze_util::{format_duration, format_timestamp, shift, Clock, Revision};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    decide, evaluate, Cancellation, Decision, Evaluation, EvaluationRequest, ResourceError,
    ResourceResult,
};

/// Per-invocation poll bookkeeping
#[derive(Debug, Clone)]
pub struct PollState {
    /// Revision the working copy is at
    pub last_revision: Revision,

    /// Revisions whose active windows were already logged
    announced: HashSet<Revision>,
}

impl PollState {
    pub fn new(revision: Revision) -> Self {
        Self {
            last_revision: revision,
            announced: HashSet::new(),
        }
    }

    /// True the first time this is called for the current revision
    pub fn announce(&mut self) -> bool {
        self.announced.insert(self.last_revision.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Evaluating,
    Blocked,
    Refreshing,
}

/// How the loop ended successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Revision the working copy ended up at
    pub revision: Revision,

    /// The clear evaluation that ended the loop
    pub evaluation: Evaluation,

    /// Number of evaluations run, at least one
    pub polls: usize,
}

/// Everything one run of the loop works on
pub struct GateLoop<'a> {
    pub source: &'a dyn SourceRepo,
    pub clock: &'a dyn Clock,
    pub copy: &'a WorkingCopy,
    pub calendar_path: &'a Path,
    pub mode: Mode,
    pub request: &'a EvaluationRequest,
    pub retry_interval: Duration,
}

impl GateLoop<'_> {
    /// Run until no window is active, the fuse blows, a refresh fails or
    /// `cancel` fires
    pub async fn run(&self, revision: Revision, cancel: &Cancellation) -> ResourceResult<GateOutcome> {
        let mut poll = PollState::new(revision);
        let mut state = GateState::Evaluating;
        let mut polls = 0;

        loop {
            state = match state {
                GateState::Evaluating => {
                    polls += 1;
                    let evaluation = self.evaluate(&poll.last_revision).await?;

                    match decide(self.mode, &evaluation, self.request) {
                        Decision::Proceed => {
                            info!(
                                revision = %poll.last_revision,
                                windows = evaluation.total,
                                polls,
                                "No active freeze window"
                            );
                            return self.finish(evaluation, polls).await;
                        }
                        Decision::Blow(violation) => {
                            return Err(ResourceError::FreezeViolation(violation));
                        }
                        Decision::Hold => {
                            if poll.announce() {
                                self.announce(&poll.last_revision, &evaluation);
                            }
                            info!(
                                active = evaluation.active_count(),
                                retry_in = %format_duration(self.retry_interval),
                                "Freeze active, waiting"
                            );
                            GateState::Blocked
                        }
                    }
                }

                GateState::Blocked => {
                    tokio::select! {
                        biased;
                        cause = cancel.cancelled() => {
                            return Err(ResourceError::Cancelled {
                                cause,
                                phase: "waiting for freeze windows to end",
                            });
                        }
                        _ = tokio::time::sleep(self.retry_interval) => GateState::Refreshing,
                    }
                }

                GateState::Refreshing => {
                    let result = tokio::select! {
                        biased;
                        cause = cancel.cancelled() => {
                            return Err(ResourceError::Cancelled {
                                cause,
                                phase: "refreshing the calendar source",
                            });
                        }
                        result = self.source.refresh(self.copy) => result,
                    };

                    let refresh = result.map_err(|source| ResourceError::Refresh {
                        revision: poll.last_revision.clone(),
                        source,
                    })?;

                    if refresh.changed {
                        info!(
                            from = %poll.last_revision.short(),
                            to = %refresh.revision.short(),
                            "Calendar source moved"
                        );
                        poll.last_revision = refresh.revision;
                    } else {
                        debug!(revision = %poll.last_revision, "Calendar source unchanged");
                    }

                    GateState::Evaluating
                }
            };
        }
    }

    async fn evaluate(&self, revision: &Revision) -> ResourceResult<Evaluation> {
        let calendar = read_calendar(self.source, self.copy, self.calendar_path, revision).await?;
        let now = self.clock.now();

        debug!(
            now = %format_timestamp(&now),
            horizon = %format_timestamp(&shift(now, self.request.runway)),
            scope = %self.request.scope_label(),
            "Evaluating calendar"
        );

        Ok(evaluate(&calendar, now, self.request))
    }

    fn announce(&self, revision: &Revision, evaluation: &Evaluation) {
        info!(
            revision = %revision.short(),
            scope = %self.request.scope_label(),
            "The following freeze windows are currently active:"
        );
        for window in &evaluation.active {
            info!(window = %window, "Active freeze window");
        }
    }

    async fn finish(&self, evaluation: Evaluation, polls: usize) -> ResourceResult<GateOutcome> {
        // Gate mode follows the branch tip, so this may differ from the
        // revision that was asked for
        let revision = self
            .source
            .current_revision(self.copy)
            .await
            .map_err(|e| ResourceError::source_failure("determine the current revision", e))?;

        Ok(GateOutcome {
            revision,
            evaluation,
            polls,
        })
    }
}

/// Read and parse the calendar file from a working copy
pub async fn read_calendar(
    source: &dyn SourceRepo,
    copy: &WorkingCopy,
    path: &Path,
    revision: &Revision,
) -> ResourceResult<Calendar> {
    let content = source.open(copy, path).await.map_err(|e| {
        ResourceError::source_failure(format!("read calendar file from path {}", path.display()), e)
    })?;

    parse_calendar(&content, CalendarFormat::from_path(path)).map_err(|source| {
        ResourceError::Calendar {
            path: path.to_path_buf(),
            revision: revision.clone(),
            source,
        }
    })
}
