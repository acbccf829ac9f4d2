//! Strongly-typed identifiers for the freeze calendar resource

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the abbreviated form used in log lines
const SHORT_LEN: usize = 7;

/// Opaque identifier for one state of the calendar source (a commit SHA for git)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Abbreviated form, e.g. `3f1c2ab`
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_equality() {
        let r1 = Revision::new("abc123");
        let r2 = Revision::new("abc123");
        let r3 = Revision::new("def456");

        assert_eq!(r1, r2);
        assert_ne!(r1, r3);
    }

    #[test]
    fn revision_short_form() {
        let rev = Revision::new("3f1c2ab9d0e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8");
        assert_eq!(rev.short(), "3f1c2ab");

        let tiny = Revision::new("abc");
        assert_eq!(tiny.short(), "abc");
    }

    #[test]
    fn revision_serializes_as_plain_string() {
        let rev = Revision::new("abc123");
        let json = serde_json::to_string(&rev).unwrap();
        assert_eq!(json, "\"abc123\"");

        let parsed: Revision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rev);
    }
}
