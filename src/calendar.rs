//! Calendar and Julian-day conversions.

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Julian Day Number of the Unix epoch date (1970-01-01).
const UNIX_EPOCH_JDN: i64 = 2_440_588;

/// Seconds per day.
const DAY_SECONDS: f64 = 86_400.0;

/// Returns the Julian day of `date`.
///
/// Without time the result is the integer Julian Day Number of the calendar
/// date. With time the result is the astronomical Julian Date: the day
/// fraction counts from the preceding noon, so midnight maps to the day
/// number minus one half.
pub fn julian_day(date: &DateTime<Utc>, include_time: bool) -> f64 {
    if include_time {
        date.timestamp() as f64 / DAY_SECONDS + (UNIX_EPOCH_JDN as f64 - 0.5)
    } else {
        (date.timestamp().div_euclid(86_400) + UNIX_EPOCH_JDN) as f64
    }
}

/// Inverse of [`julian_day`]. Returns `None` for values outside the
/// representable date range (or non-finite input).
///
/// Without time the day number is rounded and mapped to midnight of that
/// calendar date.
pub fn from_julian_day(jd: f64, include_time: bool) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let seconds = if include_time {
        ((jd - (UNIX_EPOCH_JDN as f64 - 0.5)) * DAY_SECONDS).round() as i64
    } else {
        (jd.round() as i64 - UNIX_EPOCH_JDN).checked_mul(86_400)?
    };
    Utc.timestamp_opt(seconds, 0).single()
}

/// Returns the 1-based day of the year of `date` (1 to 366).
pub fn day_of_year(date: &DateTime<Utc>) -> u32 {
    date.ordinal()
}
