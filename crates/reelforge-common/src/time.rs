//! Issue-date parsing.
//!
//! DCP manifests write timestamps as ISO-8601 with an optional UTC offset and
//! optional fractional seconds. All of them are normalized to a UTC instant
//! at whole-second precision: any fractional part rounds UP to the next
//! second, so `10:47:08.123` becomes `10:47:09`. A timestamp without an
//! offset is taken to be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{Error, Result};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an issue date into a whole-second UTC instant.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use reelforge_common::time::parse_issue_date;
///
/// let expected = Utc.with_ymd_and_hms(2013, 5, 28, 10, 47, 8).unwrap();
/// assert_eq!(parse_issue_date("2013-05-28T10:47:08+00:00").unwrap(), expected);
/// assert_eq!(parse_issue_date("2013-05-28T10:47:08Z").unwrap(), expected);
/// ```
pub fn parse_issue_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let instant = parse_instant(value).ok_or_else(|| Error::invalid_date(value))?;
    round_up_to_second(instant).ok_or_else(|| Error::invalid_date(value))
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let naive = value.strip_suffix('Z').unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn round_up_to_second(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut secs = instant.timestamp();
    if instant.timestamp_subsec_nanos() > 0 {
        secs += 1;
    }
    DateTime::from_timestamp(secs, 0)
}
