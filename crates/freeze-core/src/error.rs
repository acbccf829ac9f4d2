//! Resource errors

use freeze_api::RequestError;
use freeze_calendar::CalendarError;
use freeze_source::SourceError;
use freeze_util::Revision;
use std::path::PathBuf;
use thiserror::Error;

use crate::{CancelCause, FreezeViolation};

/// Everything a verb can fail with
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Bad request, detected before any I/O
    #[error("Invalid request: {0}")]
    Configuration(#[from] RequestError),

    #[error("Unable to {action}: {source}")]
    Source {
        action: String,
        #[source]
        source: SourceError,
    },

    #[error("Unable to load calendar {path} at revision {revision}: {source}")]
    Calendar {
        path: PathBuf,
        revision: Revision,
        #[source]
        source: CalendarError,
    },

    #[error("{0}")]
    FreezeViolation(FreezeViolation),

    #[error("Unable to refresh calendar source after revision {revision}: {source}")]
    Refresh {
        revision: Revision,
        #[source]
        source: SourceError,
    },

    #[error("Cancelled while {phase}: {cause}")]
    Cancelled {
        cause: CancelCause,
        phase: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    pub(crate) fn source_failure(action: impl Into<String>, source: SourceError) -> Self {
        Self::Source {
            action: action.into(),
            source,
        }
    }

    /// Timed out or told to stop, as opposed to failing
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn cancel_cause(&self) -> Option<CancelCause> {
        match self {
            Self::Cancelled { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;
