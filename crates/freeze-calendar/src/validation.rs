//! Calendar validation

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::schema::{RawCalendar, RawWindow};

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Window #{index}: name must not be empty")]
    MissingName { index: usize },

    #[error("Window '{window}': {field} is required")]
    MissingTimestamp { window: String, field: &'static str },

    #[error("Window '{window}': invalid {field} '{value}': {message}")]
    InvalidTimestamp {
        window: String,
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Window '{window}': ends_at {end} must be after starts_at {start}")]
    EndNotAfterStart {
        window: String,
        start: String,
        end: String,
    },

    #[error("Window '{window}': scope entries must not be empty")]
    EmptyScopeTag { window: String },
}

/// Validate a raw calendar, collecting every problem found
pub fn validate_calendar(calendar: &RawCalendar) -> Vec<ValidationError> {
    calendar
        .windows
        .iter()
        .enumerate()
        .flat_map(|(index, window)| validate_window(index, window))
        .collect()
}

/// Label used in error messages: the name if present, else the position
fn window_label(index: usize, window: &RawWindow) -> String {
    match window.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("#{}", index),
    }
}

fn validate_window(index: usize, window: &RawWindow) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let label = window_label(index, window);

    if window.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        errors.push(ValidationError::MissingName { index });
    }

    let start = check_timestamp(&label, "starts_at", window.starts_at.as_deref(), &mut errors);
    let end = check_timestamp(&label, "ends_at", window.ends_at.as_deref(), &mut errors);

    if let (Some(start), Some(end)) = (start, end)
        && end <= start
    {
        errors.push(ValidationError::EndNotAfterStart {
            window: label.clone(),
            start: freeze_util::format_timestamp(&start),
            end: freeze_util::format_timestamp(&end),
        });
    }

    if window.scope.iter().any(|tag| tag.trim().is_empty()) {
        errors.push(ValidationError::EmptyScopeTag { window: label });
    }

    errors
}

fn check_timestamp(
    label: &str,
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<DateTime<Utc>> {
    let Some(value) = value else {
        errors.push(ValidationError::MissingTimestamp {
            window: label.to_string(),
            field,
        });
        return None;
    };

    match parse_timestamp(value) {
        Ok(dt) => Some(dt),
        Err(message) => {
            errors.push(ValidationError::InvalidTimestamp {
                window: label.to_string(),
                field,
                value: value.to_string(),
                message,
            });
            None
        }
    }
}

/// Parse an RFC 3339 timestamp, normalized to UTC
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_window(name: Option<&str>, start: &str, end: &str) -> RawWindow {
        RawWindow {
            name: name.map(Into::into),
            starts_at: Some(start.into()),
            ends_at: Some(end.into()),
            scope: vec![],
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2022-12-01T06:00:00Z").unwrap();
        assert_eq!(dt.timestamp(), 1669874400);

        let dt = parse_timestamp("2022-12-01T07:00:00+01:00").unwrap();
        assert_eq!(dt.timestamp(), 1669874400);

        assert!(parse_timestamp("2022-12-01").is_err());
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn test_valid_window() {
        let calendar = RawCalendar {
            windows: vec![raw_window(
                Some("Holiday Season"),
                "2022-12-01T06:00:00Z",
                "2022-12-27T06:00:00Z",
            )],
        };
        assert!(validate_calendar(&calendar).is_empty());
    }

    #[test]
    fn test_missing_name() {
        let calendar = RawCalendar {
            windows: vec![raw_window(None, "2022-12-01T06:00:00Z", "2022-12-27T06:00:00Z")],
        };
        let errors = validate_calendar(&calendar);
        assert_eq!(errors, vec![ValidationError::MissingName { index: 0 }]);
    }

    #[test]
    fn test_end_before_start() {
        let calendar = RawCalendar {
            windows: vec![raw_window(
                Some("Wrong order"),
                "2022-12-27T06:00:00Z",
                "2022-12-01T06:00:00Z",
            )],
        };
        let errors = validate_calendar(&calendar);
        assert!(matches!(
            &errors[..],
            [ValidationError::EndNotAfterStart { window, .. }] if window == "Wrong order"
        ));
    }

    #[test]
    fn test_zero_length_window_rejected() {
        let calendar = RawCalendar {
            windows: vec![raw_window(
                Some("Instant"),
                "2022-12-01T06:00:00Z",
                "2022-12-01T06:00:00Z",
            )],
        };
        assert_eq!(validate_calendar(&calendar).len(), 1);
    }

    #[test]
    fn test_errors_are_collected_across_windows() {
        let calendar = RawCalendar {
            windows: vec![
                RawWindow {
                    name: Some("No end".into()),
                    starts_at: Some("2022-12-01T06:00:00Z".into()),
                    ends_at: None,
                    scope: vec!["".into()],
                },
                raw_window(Some("Bad start"), "yesterday", "2022-12-01T06:00:00Z"),
            ],
        };

        let errors = validate_calendar(&calendar);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::MissingTimestamp { field: "ends_at", .. }
        )));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::EmptyScopeTag { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidTimestamp { field: "starts_at", .. }
        )));
    }
}
