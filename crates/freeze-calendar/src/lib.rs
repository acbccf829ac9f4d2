//! Freeze calendar parsing and validation
//!
//! Supports YAML (and TOML) calendars with:
//! - A top-level `freeze_calendar` list of windows
//! - RFC 3339 `starts_at` / `ends_at` timestamps
//! - Optional scope tags per window
//! - Validation with clear error messages

mod calendar;
mod schema;
mod validation;

pub use calendar::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Calendar errors
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Failed to read calendar file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Calendar is not valid UTF-8: {0}")]
    EncodingError(#[from] std::str::Utf8Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(errors))]
    ValidationFailed { errors: Vec<ValidationError> },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Serialization format of a calendar file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarFormat {
    #[default]
    Yaml,
    Toml,
}

impl CalendarFormat {
    /// `.toml` files are TOML, everything else is YAML
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Load and validate a calendar from a file
pub fn load_calendar(path: impl AsRef<Path>) -> CalendarResult<Calendar> {
    let path = path.as_ref();
    let content = std::fs::read(path)?;
    parse_calendar(&content, CalendarFormat::from_path(path))
}

/// Parse and validate a calendar from raw file content
pub fn parse_calendar(content: &[u8], format: CalendarFormat) -> CalendarResult<Calendar> {
    let text = std::str::from_utf8(content)?;

    let raw = match format {
        CalendarFormat::Yaml => parse_yaml(text)?,
        CalendarFormat::Toml => parse_toml(text)?,
    };

    let errors = validate_calendar(&raw);
    if !errors.is_empty() {
        return Err(CalendarError::ValidationFailed { errors });
    }

    let calendar = Calendar::from_raw(raw);
    tracing::debug!(window_count = calendar.len(), "Calendar loaded");
    Ok(calendar)
}

fn parse_yaml(text: &str) -> CalendarResult<RawCalendar> {
    if text.trim().is_empty() {
        return Ok(RawCalendar::default());
    }
    // An empty document (`---`) decodes as null
    let raw: Option<RawCalendar> = serde_yaml::from_str(text)?;
    Ok(raw.unwrap_or_default())
}

fn parse_toml(text: &str) -> CalendarResult<RawCalendar> {
    let mut table: toml::Table = toml::from_str(text)?;
    for (_, value) in table.iter_mut() {
        stringify_datetimes(value);
    }
    Ok(toml::Value::Table(table).try_into()?)
}

/// TOML has native datetimes; the schema takes them as RFC 3339 strings
fn stringify_datetimes(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(dt) => {
            let text = dt.to_string();
            *value = toml::Value::String(text);
        }
        toml::Value::Array(items) => items.iter_mut().for_each(stringify_datetimes),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| stringify_datetimes(v)),
        _ => {}
    }
}
