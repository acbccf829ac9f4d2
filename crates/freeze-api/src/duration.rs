//! Serde adapters for duration strings (`"10s"`, `"1h30m"`)

use freeze_util::{format_duration, parse_duration};
use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;

pub mod duration_str {
    use super::*;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*d))
    }

    /// Null reads as zero
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => parse_duration(&s).map_err(de::Error::custom),
            None => Ok(Duration::ZERO),
        }
    }
}

pub mod option_duration_str {
    use super::*;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => serializer.serialize_str(&format_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_duration(&s).map_err(de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Delays {
        #[serde(default, with = "duration_str")]
        runway: Duration,
        #[serde(default, with = "option_duration_str")]
        retry: Option<Duration>,
    }

    #[test]
    fn serializes_in_readable_form() {
        let delays = Delays {
            runway: Duration::from_secs(5400),
            retry: Some(Duration::from_millis(1500)),
        };
        let json = serde_json::to_string(&delays).unwrap();
        assert_eq!(json, r#"{"runway":"1h 30m","retry":"1s 500ms"}"#);
        assert_eq!(serde_json::from_str::<Delays>(&json).unwrap(), delays);
    }

    #[test]
    fn null_runway_is_zero() {
        let delays: Delays = serde_json::from_str(r#"{"runway": null, "retry": null}"#).unwrap();
        assert_eq!(delays.runway, Duration::ZERO);
        assert_eq!(delays.retry, None);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = serde_json::from_str::<Delays>(r#"{"runway": "-1h"}"#).unwrap_err();
        assert!(err.to_string().contains("Negative duration"), "{}", err);
    }
}
