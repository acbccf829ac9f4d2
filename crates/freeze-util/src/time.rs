//! Time utilities for the freeze calendar resource
//!
//! Freeze windows are evaluated against a [`Clock`] that is passed in
//! explicitly, never read from ambient state:
//! - [`SystemClock`] reads the wall clock
//! - [`OffsetClock`] starts at a chosen instant and advances with real time
//! - [`MockClock`] only moves when a test moves it
//!
//! # Mock Time for Development
//!
//! In debug builds the resource binary accepts `FREEZE_MOCK_TIME` (RFC 3339)
//! and evaluates calendars against an [`OffsetClock`] starting at that instant.
//!
//! Example:
//! ```bash
//! FREEZE_MOCK_TIME="2023-12-24T18:00:00Z" freeze-resource in /tmp/dest < request.json
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{DurationError, DurationResult};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FREEZE_MOCK_TIME";

/// Capability that yields "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::disallowed_methods)] // This is the one place that reads Utc::now()
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that reports a fixed offset from the system clock, so it starts at
/// a chosen instant and then advances at the same rate as real time.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    offset: chrono::Duration,
}

impl OffsetClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        let offset = start.signed_duration_since(SystemClock.now());
        tracing::info!(
            mock_time = %format_timestamp(&start),
            offset_secs = offset.num_seconds(),
            "Mock time enabled"
        );
        Self { offset }
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> DateTime<Utc> {
        let real_now = SystemClock.now();
        real_now.checked_add_signed(self.offset).unwrap_or(real_now)
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same instant, so a test can keep one handle and move
/// time while the code under test reads another.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(at)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = shift(*now, by);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse the mock time value (RFC 3339, e.g. `2023-08-11T19:00:00Z`)
pub fn parse_mock_time(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

/// Move `at` forward by `by`, saturating at the latest representable instant
pub fn shift(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Format a timestamp the way calendars write them, e.g. `2023-07-20T09:00:00Z`
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a duration for logs and responses, e.g. `1h 30m` or `250ms`
pub fn format_duration(d: Duration) -> String {
    humantime::format_duration(d).to_string()
}

/// Parse a duration string: one or more `<number><unit>` groups, e.g.
/// `10s`, `1m30s`, `1h 30m`, `250ms`. A bare `0` is zero.
pub fn parse_duration(input: &str) -> DurationResult<Duration> {
    let s = input.trim();
    if s.starts_with('-') {
        return Err(DurationError::Negative(input.to_string()));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    humantime::parse_duration(s).map_err(|source| DurationError::Invalid {
        input: input.to_string(),
        source,
    })
}
