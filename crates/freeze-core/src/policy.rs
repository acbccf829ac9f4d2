//! Mode policy

use freeze_api::Mode;
use freeze_calendar::Window;
use std::fmt;
use std::time::Duration;

use crate::{Evaluation, EvaluationRequest};

/// Lowest retry interval the gate loop will poll with
pub const MIN_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Retry interval when the request does not set one
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Retry interval to poll with, raised to [`MIN_RETRY_INTERVAL`] when lower
pub fn effective_retry_interval(requested: Option<Duration>) -> Duration {
    requested
        .unwrap_or(DEFAULT_RETRY_INTERVAL)
        .max(MIN_RETRY_INTERVAL)
}

/// Active freeze windows that blew the fuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeViolation {
    pub scope: Vec<String>,
    pub windows: Vec<Window>,
}

impl FreezeViolation {
    pub fn window_names(&self) -> Vec<&str> {
        self.windows.iter().map(|w| w.name.as_str()).collect()
    }
}

impl fmt::Display for FreezeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.scope.is_empty() {
            "(none)".to_string()
        } else {
            self.scope.join(", ")
        };
        let windows = self
            .windows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "fuse has blown because the following freeze windows are currently active for the scope {}: {}",
            scope, windows
        )
    }
}

/// What to do after an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No active window, report success
    Proceed,

    /// Fuse mode found active windows
    Blow(FreezeViolation),

    /// Gate mode found active windows, keep polling
    Hold,
}

/// Apply the mode to an evaluation
pub fn decide(mode: Mode, evaluation: &Evaluation, request: &EvaluationRequest) -> Decision {
    if evaluation.is_clear() {
        return Decision::Proceed;
    }

    match mode {
        Mode::Fuse => Decision::Blow(FreezeViolation {
            scope: request.scope.clone(),
            windows: evaluation.active.clone(),
        }),
        Mode::Gate => Decision::Hold,
    }
}
