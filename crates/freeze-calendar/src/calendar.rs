//! Validated calendar structures

use chrono::{DateTime, Utc};
use freeze_util::format_timestamp;
use std::fmt;

use crate::schema::{RawCalendar, RawWindow};
use crate::validation::parse_timestamp;

/// Validated calendar ready for evaluation. Window order follows the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    pub windows: Vec<Window>,
}

impl Calendar {
    pub fn new(windows: Vec<Window>) -> Self {
        Self { windows }
    }

    /// Convert from raw calendar (after validation)
    pub fn from_raw(raw: RawCalendar) -> Self {
        Self {
            windows: raw.windows.into_iter().filter_map(Window::from_raw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }
}

/// One freeze interval, optionally restricted to scope tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Empty means the window applies to every scope
    pub scope: Vec<String>,
}

impl Window {
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            scope: Vec::new(),
        }
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    fn from_raw(raw: RawWindow) -> Option<Self> {
        let start = parse_timestamp(raw.starts_at.as_deref()?).ok()?;
        let end = parse_timestamp(raw.ends_at.as_deref()?).ok()?;
        Some(Self {
            name: raw.name.unwrap_or_default(),
            start,
            end,
            scope: raw.scope,
        })
    }

    /// `end > start`; anything else never contains an instant
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Check if `at` lies in this window, both bounds inclusive
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.is_well_formed() && self.start <= at && at <= self.end
    }

    /// Window without scope tags
    pub fn is_global(&self) -> bool {
        self.scope.is_empty()
    }

    /// Check if the window applies to a requested scope tag
    pub fn applies_to(&self, tag: &str) -> bool {
        self.is_global() || self.scope.iter().any(|s| s == tag)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} to {}",
            self.name,
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )?;

        if !self.scope.is_empty() {
            write!(f, "; scope: {}", self.scope.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn holiday() -> Window {
        Window::new(
            "Holiday Season",
            Utc.with_ymd_and_hms(2022, 12, 1, 6, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 12, 27, 6, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = holiday();
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(window.contains(Utc.with_ymd_and_hms(2022, 12, 24, 18, 0, 0).unwrap()));
        assert!(!window.contains(window.start - chrono::Duration::seconds(1)));
        assert!(!window.contains(window.end + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_inverted_window_contains_nothing() {
        let mut window = holiday();
        std::mem::swap(&mut window.start, &mut window.end);
        assert!(!window.is_well_formed());
        assert!(!window.contains(Utc.with_ymd_and_hms(2022, 12, 24, 18, 0, 0).unwrap()));
    }

    #[test]
    fn test_applies_to() {
        let global = holiday();
        assert!(global.applies_to("eu-de"));

        let scoped = holiday().with_scope(["eu-de", "us-east"]);
        assert!(scoped.applies_to("eu-de"));
        assert!(!scoped.applies_to("ap-southeast"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            holiday().to_string(),
            "Holiday Season from 2022-12-01T06:00:00Z to 2022-12-27T06:00:00Z"
        );
        assert_eq!(
            holiday().with_scope(["eu-de", "us-east"]).to_string(),
            "Holiday Season from 2022-12-01T06:00:00Z to 2022-12-27T06:00:00Z; scope: eu-de, us-east"
        );
    }
}
