//! Lenient timestamp parsing shared by request payloads.
//!
//! Clients send either full RFC 3339 timestamps or bare `YYYY-MM-DD` dates
//! (the form date pickers produce). Bare dates are read as midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD"))
}

/// Absent, `null` and empty strings all read as `None`.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_timestamp(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// Patch semantics: a missing field stays `None` (via `#[serde(default)]`),
/// an explicit `null` or empty string becomes `Some(None)` and clears the value.
pub fn deserialize_patch_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_timestamp(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-14T09:30:00Z"), Ok(expected));
        assert_eq!(parse_timestamp("2025-03-14T10:30:00+01:00"), Ok(expected));

        let midnight = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(" 2025-03-14 "), Ok(midnight));
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_timestamp("14/03/2025").expect_err("not a supported format");
        assert!(err.contains("14/03/2025"));
        assert!(parse_timestamp("2025-02-30").is_err());
    }
}
