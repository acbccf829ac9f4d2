//! Raw calendar schema (as parsed from YAML or TOML)

use serde::{Deserialize, Deserializer, Serialize};

/// Raw calendar document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCalendar {
    /// Freeze windows, in file order
    #[serde(default, rename = "freeze_calendar", deserialize_with = "nullable")]
    pub windows: Vec<RawWindow>,
}

/// Raw freeze window
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawWindow {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Start timestamp (RFC 3339)
    #[serde(default)]
    pub starts_at: Option<String>,

    /// End timestamp (RFC 3339)
    #[serde(default)]
    pub ends_at: Option<String>,

    /// Scope tags; absent or empty means the window applies everywhere
    #[serde(default, deserialize_with = "nullable")]
    pub scope: Vec<String>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
