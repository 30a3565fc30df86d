//! Conversion of Slack timestamp strings into absolute instants.
//!
//! Slack encodes message timestamps as fractional-seconds Unix time in a
//! string, e.g. `"1589100000.000400"`. The fractional part doubles as a
//! uniqueness suffix and is discarded here; ordering of messages is done on
//! the raw string, which is zero-padded and therefore sorts lexicographically.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A timestamp string that could not be interpreted.
///
/// Treated as fatal by callers: ordering and rate computation both depend on
/// valid timestamps, so there is no sensible recovery.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid Slack timestamp '{0}'")]
pub struct TimestampError(pub String);

/// Convert a fractional-seconds timestamp string to a UTC instant,
/// truncated to whole seconds.
pub fn to_datetime(ts: &str) -> Result<DateTime<Utc>, TimestampError> {
    let seconds: f64 = ts
        .trim()
        .parse()
        .map_err(|_| TimestampError(ts.to_string()))?;
    DateTime::from_timestamp(seconds.floor() as i64, 0)
        .ok_or_else(|| TimestampError(ts.to_string()))
}
