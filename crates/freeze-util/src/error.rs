//! Error types shared across the freeze calendar crates

use thiserror::Error;

/// Failure to parse a duration string such as `1h30m`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DurationError {
    #[error("Negative duration '{0}' is not allowed")]
    Negative(String),

    #[error("Invalid duration '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: humantime::DurationError,
    },
}

pub type DurationResult<T> = std::result::Result<T, DurationError>;
