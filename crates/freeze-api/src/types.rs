//! Shared types for the resource envelope

use freeze_util::Revision;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{RequestError, option_duration_str, duration_str};

/// Where the freeze calendar lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Repository URI (the git resource calls it uri, so we do, too)
    #[serde(default)]
    pub uri: String,

    /// Branch to track; the remote's default branch when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Path of the calendar file inside the repository
    #[serde(default)]
    pub path: String,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

/// A version of the resource as seen by the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub sha: Revision,
}

impl Version {
    pub fn new(sha: impl Into<Revision>) -> Self {
        Self { sha: sha.into() }
    }
}

impl From<Revision> for Version {
    fn from(sha: Revision) -> Self {
        Self { sha }
    }
}

/// Metadata entry shown next to a fetched version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValuePair {
    pub name: String,
    pub value: String,
}

impl NameValuePair {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// What `in` does when a freeze window is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fail immediately
    Fuse,
    /// Block and poll until no window is active
    Gate,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Fuse, Mode::Gate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fuse => "fuse",
            Mode::Gate => "gate",
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Mode::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| RequestError::InvalidMode {
                value: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Parameters of the `in` verb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetParams {
    pub mode: Mode,

    /// Scope tags to check; empty means every window applies
    #[serde(default, deserialize_with = "nullable_vec")]
    pub scope: Vec<String>,

    /// Look-ahead added to "now" before testing containment
    #[serde(default, with = "duration_str")]
    pub runway: Duration,

    /// Delay between polls in gate mode
    #[serde(
        default,
        with = "option_duration_str",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_interval: Option<Duration>,

    #[serde(default)]
    pub verbose: bool,
}

fn nullable_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
