//! PDF date string normalization.
//!
//! PDF metadata dates use the `D:YYYYMMDDHHMMSS+HH'MM'` convention. Values
//! that carry the full timestamp-plus-offset shape are resolved into
//! timezone-aware timestamps; anything else that still starts with the `D:`
//! sentinel is passed through opaquely so downstream consumers can decide
//! what to do with it.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone};
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A normalized PDF date.
///
/// Either a fully resolved timestamp with UTC offset, or the raw value
/// (prefix stripped) when it does not match the extended timestamp pattern.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfDate {
    /// Timestamp resolved from the 14-digit pattern plus signed offset.
    Resolved(DateTime<FixedOffset>),
    /// Verbatim pass-through of a value that did not match the pattern.
    Opaque(String),
}

impl PdfDate {
    /// The resolved timestamp, if this date carries one.
    pub fn resolved(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            PdfDate::Resolved(dt) => Some(*dt),
            PdfDate::Opaque(_) => None,
        }
    }

    /// Whether this date resolved to a comparable timestamp.
    pub fn is_resolved(&self) -> bool {
        matches!(self, PdfDate::Resolved(_))
    }
}

impl fmt::Display for PdfDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfDate::Resolved(dt) => write!(f, "{}", dt.to_rfc3339()),
            PdfDate::Opaque(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for PdfDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses raw PDF date strings into [`PdfDate`] values.
pub struct DateNormalizer {
    pattern: Regex,
}

impl DateNormalizer {
    /// Create a normalizer with the timestamp pattern compiled.
    pub fn new() -> Self {
        // Prefix match: trailing bytes after the offset are tolerated.
        // ASCII digit classes only; metadata strings can carry arbitrary
        // Unicode and the captures are sliced bytewise below.
        Self {
            pattern: Regex::new(r"^([0-9]{14})([+-][0-9]{2})'?([0-9]{2})'?").unwrap(),
        }
    }

    /// Normalize a raw date value from the named metadata field.
    ///
    /// Returns `Ok(None)` when the value is missing or lacks the `D:`
    /// sentinel. A value matching the full timestamp shape becomes
    /// [`PdfDate::Resolved`]; one that does not becomes
    /// [`PdfDate::Opaque`] holding the stripped string verbatim.
    ///
    /// Out-of-range calendar fields that still match the digit pattern
    /// (e.g. month 13) are not sanitized and yield
    /// [`Error::MalformedDate`].
    pub fn normalize(&self, field: &'static str, raw: Option<&str>) -> Result<Option<PdfDate>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let Some(stripped) = raw.strip_prefix("D:") else {
            return Ok(None);
        };
        let Some(caps) = self.pattern.captures(stripped) else {
            return Ok(Some(PdfDate::Opaque(stripped.to_string())));
        };

        let malformed = || Error::MalformedDate {
            field,
            value: raw.to_string(),
        };

        let digits = &caps[1];
        let year: i32 = digits[0..4].parse().map_err(|_| malformed())?;
        let month: u32 = digits[4..6].parse().map_err(|_| malformed())?;
        let day: u32 = digits[6..8].parse().map_err(|_| malformed())?;
        let hour: u32 = digits[8..10].parse().map_err(|_| malformed())?;
        let minute: u32 = digits[10..12].parse().map_err(|_| malformed())?;
        let second: u32 = digits[12..14].parse().map_err(|_| malformed())?;

        let tz_hour: i32 = caps[2].parse().map_err(|_| malformed())?;
        let tz_minute: i32 = caps[3].parse().map_err(|_| malformed())?;
        // The minute offset inherits the hour offset's sign.
        let sign = if tz_hour < 0 { -1 } else { 1 };
        let offset_seconds = tz_hour * 3600 + sign * tz_minute * 60;
        let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| malformed())?;

        let timestamp = offset
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .ok_or_else(|| malformed())?;

        Ok(Some(PdfDate::Resolved(timestamp)))
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Offset, Timelike};

    fn normalize(raw: &str) -> Result<Option<PdfDate>> {
        DateNormalizer::new().normalize("CreationDate", Some(raw))
    }

    #[test]
    fn test_full_timestamp_resolves() {
        let date = normalize("D:20230101120000+01'00'").unwrap().unwrap();
        let dt = date.resolved().unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.offset().fix().local_minus_utc(), 3600);
        assert_eq!(date.to_string(), "2023-01-01T12:00:00+01:00");
    }

    #[test]
    fn test_rfc3339_round_trip() {
        let date = normalize("D:20240229235959-08'00'").unwrap().unwrap();
        let reparsed = DateTime::parse_from_rfc3339(&date.to_string()).unwrap();
        assert_eq!(Some(reparsed), date.resolved());
        assert_eq!(reparsed.offset().fix().local_minus_utc(), -8 * 3600);
        assert_eq!(reparsed.second(), 59);
    }

    #[test]
    fn test_minute_offset_inherits_hour_sign() {
        let date = normalize("D:20230601000000-05'30'").unwrap().unwrap();
        let dt = date.resolved().unwrap();
        assert_eq!(dt.offset().fix().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_missing_value_is_absent() {
        let normalizer = DateNormalizer::new();
        assert_eq!(normalizer.normalize("ModDate", None).unwrap(), None);
    }

    #[test]
    fn test_unprefixed_value_is_absent() {
        assert_eq!(normalize("20230101120000+00'00'").unwrap(), None);
        assert_eq!(normalize("").unwrap(), None);
    }

    #[test]
    fn test_non_matching_value_passes_through() {
        let date = normalize("D:2023").unwrap().unwrap();
        assert_eq!(date, PdfDate::Opaque("2023".to_string()));

        let date = normalize("D:January 1st 2023").unwrap().unwrap();
        assert_eq!(date, PdfDate::Opaque("January 1st 2023".to_string()));
    }

    #[test]
    fn test_trailing_bytes_tolerated() {
        let date = normalize("D:20230101120000+00'00'Z junk").unwrap().unwrap();
        assert!(date.is_resolved());
    }

    #[test]
    fn test_unquoted_offset_accepted() {
        let date = normalize("D:20230101120000+0130").unwrap().unwrap();
        let dt = date.resolved().unwrap();
        assert_eq!(dt.offset().fix().local_minus_utc(), 3600 + 30 * 60);
    }

    #[test]
    fn test_out_of_range_month_is_fatal() {
        let err = normalize("D:20231301000000+00'00'").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedDate {
                field: "CreationDate",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_day_is_fatal() {
        assert!(normalize("D:20230230120000+00'00'").is_err());
    }

    #[test]
    fn test_absurd_offset_is_fatal() {
        assert!(normalize("D:20230101120000+99'00'").is_err());
    }
}
