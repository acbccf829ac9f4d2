//! Request envelopes for the three verbs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{GetParams, RequestResult, Source, Version};

/// Common behaviour of every request envelope
pub trait Request: DeserializeOwned {
    fn source(&self) -> &Source;

    fn version(&self) -> Option<&Version>;

    /// Whether the caller asked for debug output
    fn wants_debug(&self) -> bool {
        self.source().debug
    }

    fn validate(&self) -> RequestResult<()> {
        self.source().validate()?;
        if let Some(version) = self.version() {
            version.validate()?;
        }
        Ok(())
    }
}

/// Decode a request envelope from JSON and validate it
pub fn decode_request<R: Request>(input: &str) -> RequestResult<R> {
    let request: R = serde_json::from_str(input)?;
    request.validate()?;
    Ok(request)
}

/// `check`: which versions exist at or after the given one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

impl Request for CheckRequest {
    fn source(&self) -> &Source {
        &self.source
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }
}

/// `in`: fetch the calendar and evaluate it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
    pub params: GetParams,
}

impl Request for GetRequest {
    fn source(&self) -> &Source {
        &self.source
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    fn wants_debug(&self) -> bool {
        self.source.debug || self.params.verbose
    }
}

/// `out`: accepted and ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request for PutRequest {
    fn source(&self) -> &Source {
        &self.source
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mode, RequestError};
    use std::time::Duration;

    #[test]
    fn decode_get_request() {
        let req: GetRequest = decode_request(
            r#"{
                "source": { "uri": "/tmp/remote", "path": "calendar.yaml", "private_key": "ignored" },
                "version": { "sha": "abc123" },
                "params": { "mode": "gate", "retry_interval": "10s", "verbose": true }
            }"#,
        )
        .unwrap();

        assert_eq!(req.params.mode, Mode::Gate);
        assert_eq!(req.params.retry_interval, Some(Duration::from_secs(10)));
        assert_eq!(req.version.unwrap().sha.as_str(), "abc123");
        assert!(req.source.branch.is_none());
    }

    #[test]
    fn get_request_requires_params() {
        let err = decode_request::<GetRequest>(
            r#"{ "source": { "uri": "/tmp/remote", "path": "calendar.yaml" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn invalid_mode_is_a_decode_error() {
        let err = decode_request::<GetRequest>(
            r#"{ "source": { "uri": "/tmp/remote", "path": "c.yaml" }, "params": { "mode": "melt" } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("is not a valid mode"));
    }

    #[test]
    fn check_request_validates_source() {
        let err = decode_request::<CheckRequest>(r#"{ "source": { "uri": "/tmp/remote" } }"#)
            .unwrap_err();
        assert!(matches!(err, RequestError::MissingField("path")));
    }

    #[test]
    fn check_request_version_is_optional() {
        let req: CheckRequest = decode_request(
            r#"{ "source": { "uri": "/tmp/remote", "path": "c.yaml" }, "version": null }"#,
        )
        .unwrap();
        assert!(req.version.is_none());
    }

    #[test]
    fn verbose_params_ask_for_debug() {
        let req: GetRequest = decode_request(
            r#"{ "source": { "uri": "/r", "path": "c.yaml" }, "params": { "mode": "fuse", "verbose": true } }"#,
        )
        .unwrap();
        assert!(req.wants_debug());

        let req: PutRequest =
            decode_request(r#"{ "source": { "uri": "/r", "path": "c.yaml", "debug": true } }"#)
                .unwrap();
        assert!(req.wants_debug());
    }
}
