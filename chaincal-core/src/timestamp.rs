//! Conversions between user-entered dates and ledger timestamps.
//!
//! The ledger stores instants as integer milliseconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ChainCalError, ChainCalResult};

pub fn from_millis(ms: u64) -> Option<DateTime<Utc>> {
    i64::try_from(ms).ok().and_then(DateTime::from_timestamp_millis)
}

pub fn to_millis(dt: &DateTime<Utc>) -> ChainCalResult<u64> {
    u64::try_from(dt.timestamp_millis())
        .map_err(|_| ChainCalError::InvalidDate(dt.to_rfc3339()))
}

/// Parse an ISO-like date string into an instant.
///
/// Accepts RFC 3339 (`2024-01-01T09:00:00Z`), a naive date-time
/// (`2024-01-01T09:00` or with seconds) or a bare date (`2024-01-01`, midnight).
/// Inputs without an offset are read in `tz`.
pub fn parse_instant(s: &str, tz: Tz) -> ChainCalResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ChainCalError::InvalidDate(s.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ChainCalError::InvalidDate(s.to_string()))
}

/// Parse an ISO-like date string straight into ledger milliseconds.
pub fn parse_millis(s: &str, tz: Tz) -> ChainCalResult<u64> {
    to_millis(&parse_instant(s, tz)?)
}
