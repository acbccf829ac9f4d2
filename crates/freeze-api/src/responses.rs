//! Response envelopes written to stdout

use serde::{Deserialize, Serialize};

use crate::{NameValuePair, Version};

/// Response of `check`: versions in chronological order, oldest first
pub type CheckResponse = Vec<Version>;

/// Response of `in` and `out`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: Version,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<NameValuePair>,
}

impl VersionResponse {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push(NameValuePair::new(name, value));
        self
    }

    /// Look up a metadata value by name
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::METADATA_TOTAL_WINDOWS;

    #[test]
    fn response_serializes_metadata_pairs() {
        let response = VersionResponse::new(Version::new("abc123"))
            .with_metadata(METADATA_TOTAL_WINDOWS, 3);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["version"]["sha"], "abc123");
        assert_eq!(json["metadata"][0]["name"], "total number of freeze windows");
        assert_eq!(json["metadata"][0]["value"], "3");
        assert_eq!(response.metadata_value(METADATA_TOTAL_WINDOWS), Some("3"));
    }

    #[test]
    fn empty_metadata_is_omitted() {
        let json = serde_json::to_string(&VersionResponse::new(Version::new("abc"))).unwrap();
        assert_eq!(json, r#"{"version":{"sha":"abc"}}"#);
    }
}
