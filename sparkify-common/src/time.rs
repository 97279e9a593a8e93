//! Timestamp utilities

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Convert a millisecond Unix epoch value to a UTC timestamp
///
/// Fails with [`Error::InvalidInput`] when the value lies outside the range
/// chrono can represent.
pub fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        Error::InvalidInput(format!("timestamp out of range: {} ms", millis))
    })
}
