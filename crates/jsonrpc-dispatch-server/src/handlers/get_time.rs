//! Method: getTime. Current time, optionally in a given zone.
//!
//! Zones are IANA names (`Asia/Tokyo`, matched case-insensitively), the
//! `UTC`/`GMT`/`Z` aliases, or a fixed offset such as `+05:30`, `-0800` or
//! `UTC+2`. An empty zone means UTC. Anything else fails the call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use jsonrpc_dispatch::{MethodHandler, ParamsSchema};

use super::HandlerDefinition;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TimeParams {
    /// IANA zone name, UTC, or a fixed offset like +05:30
    #[serde(default)]
    #[schemars(with = "String")]
    pub timezone: Option<String>,
}

pub struct GetTime;

#[async_trait]
impl MethodHandler for GetTime {
    async fn invoke(&self, params: Option<Value>) -> anyhow::Result<Value> {
        let params: TimeParams = match params {
            Some(value) => serde_json::from_value(value)?,
            None => TimeParams::default(),
        };
        let time = format_time(Utc::now(), params.timezone.as_deref())?;
        Ok(json!({ "time": time }))
    }
}

pub fn definition() -> HandlerDefinition {
    HandlerDefinition {
        name: "getTime",
        description: "Return the current time as an RFC 3339 timestamp",
        schema: Some(ParamsSchema::of::<TimeParams>()),
        handler: Arc::new(GetTime),
    }
}

#[derive(Debug, Clone, Copy)]
enum Zone {
    Utc,
    Named(Tz),
    Fixed(FixedOffset),
}

/// Render `now` in `timezone` (UTC when absent or empty), millisecond precision.
pub fn format_time(now: DateTime<Utc>, timezone: Option<&str>) -> anyhow::Result<String> {
    let zone = match timezone {
        None | Some("") => Zone::Utc,
        Some(name) => parse_zone(name)
            .ok_or_else(|| anyhow::anyhow!("Invalid time zone specified: {name}"))?,
    };

    Ok(match zone {
        Zone::Utc => now.to_rfc3339_opts(SecondsFormat::Millis, true),
        Zone::Named(tz) => now
            .with_timezone(&tz)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        Zone::Fixed(offset) => now
            .with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn parse_zone(zone: &str) -> Option<Zone> {
    let trimmed = zone.trim();
    let upper = trimmed.to_ascii_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z" | "ETC/UTC" | "ETC/GMT") {
        return Some(Zone::Utc);
    }
    if let Ok(tz) = Tz::from_str_insensitive(trimmed) {
        return Some(Zone::Named(tz));
    }
    parse_offset(&upper).map(Zone::Fixed)
}

fn parse_offset(upper: &str) -> Option<FixedOffset> {
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(upper);

    let (sign, digits) = if let Some(d) = rest.strip_prefix('+') {
        (1, d)
    } else if let Some(d) = rest.strip_prefix('-') {
        (-1, d)
    } else {
        return None;
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_default_is_utc_iso() {
        assert_eq!(
            format_time(fixed_now(), None).unwrap(),
            "2024-03-01T12:30:00.000Z"
        );
    }

    #[test]
    fn test_utc_aliases() {
        for zone in ["UTC", "utc", "GMT", "Z", "Etc/UTC"] {
            assert_eq!(
                format_time(fixed_now(), Some(zone)).unwrap(),
                "2024-03-01T12:30:00.000Z",
                "zone {zone}"
            );
        }
    }

    #[test]
    fn test_fixed_offsets() {
        assert_eq!(
            format_time(fixed_now(), Some("+05:30")).unwrap(),
            "2024-03-01T18:00:00.000+05:30"
        );
        assert_eq!(
            format_time(fixed_now(), Some("-0800")).unwrap(),
            "2024-03-01T04:30:00.000-08:00"
        );
        assert_eq!(
            format_time(fixed_now(), Some("UTC+2")).unwrap(),
            "2024-03-01T14:30:00.000+02:00"
        );
    }

    #[test]
    fn test_iana_zones() {
        assert_eq!(
            format_time(fixed_now(), Some("Asia/Tokyo")).unwrap(),
            "2024-03-01T21:30:00.000+09:00"
        );
        assert_eq!(
            format_time(fixed_now(), Some("America/New_York")).unwrap(),
            "2024-03-01T07:30:00.000-05:00"
        );
        assert_eq!(
            format_time(fixed_now(), Some("asia/tokyo")).unwrap(),
            "2024-03-01T21:30:00.000+09:00"
        );
    }

    #[test]
    fn test_empty_zone_means_utc() {
        assert_eq!(
            format_time(fixed_now(), Some("")).unwrap(),
            "2024-03-01T12:30:00.000Z"
        );
    }

    #[test]
    fn test_unknown_zone_fails() {
        let err = format_time(fixed_now(), Some("Mars/Olympus")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid time zone specified: Mars/Olympus");
        assert!(format_time(fixed_now(), Some("+25:00")).is_err());
    }

    #[test]
    fn test_output_parses_back() {
        let rendered = format_time(Utc::now(), Some("-03:00")).unwrap();
        assert!(DateTime::parse_from_rfc3339(&rendered).is_ok());
    }

    #[tokio::test]
    async fn test_invoke_returns_time_object() {
        let result = GetTime.invoke(Some(json!({"timezone": "UTC"}))).await.unwrap();
        let time = result["time"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(time).is_ok());
    }
}
