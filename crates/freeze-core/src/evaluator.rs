//! Freeze window evaluation

use chrono::{DateTime, Utc};
use freeze_calendar::{Calendar, Window};
use freeze_util::shift;
use std::time::Duration;

/// What the caller asks the evaluator about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// Requested scope tags; empty means no restriction
    pub scope: Vec<String>,

    /// Look-ahead added to "now" before containment is tested
    pub runway: Duration,
}

impl EvaluationRequest {
    pub fn new(scope: Vec<String>, runway: Duration) -> Self {
        Self { scope, runway }
    }

    /// Requested scope as shown to operators
    pub fn scope_label(&self) -> String {
        if self.scope.is_empty() {
            "(none)".into()
        } else {
            self.scope.join(", ")
        }
    }
}

/// Result of evaluating one calendar snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Number of windows in the calendar
    pub total: usize,

    /// Windows active for the requested scope, in calendar order
    pub active: Vec<Window>,
}

impl Evaluation {
    pub fn is_clear(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Evaluate a calendar against `now` and a request
pub fn evaluate(calendar: &Calendar, now: DateTime<Utc>, request: &EvaluationRequest) -> Evaluation {
    Evaluation {
        total: calendar.len(),
        active: active_windows(calendar, now, request.runway, &request.scope),
    }
}

/// Windows containing `now + runway` that match the requested scope.
///
/// Multiple scope tags are a union: a window matches if it matches any of
/// them. Global windows (no scope tags) match every request.
pub fn active_windows(
    calendar: &Calendar,
    now: DateTime<Utc>,
    runway: Duration,
    scope: &[String],
) -> Vec<Window> {
    let horizon = shift(now, runway);

    calendar
        .iter()
        .filter(|window| window.contains(horizon))
        .filter(|window| scope.is_empty() || scope.iter().any(|tag| window.applies_to(tag)))
        .cloned()
        .collect()
}
