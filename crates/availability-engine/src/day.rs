//! Local calendar-day arithmetic in an explicit time zone.
//!
//! Roster and opening-hour definitions are expressed per calendar day, so
//! multi-day queries are chunked on local midnight. A local day can be 23 or
//! 25 hours long across a DST transition; minutes-of-day are measured as
//! elapsed time since local midnight.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};
use crate::interval::Window;

/// Parse an IANA time zone name (e.g. "Australia/Melbourne").
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| AvailabilityError::InvalidTimezone(name.to_string()))
}

/// The local calendar date of an instant.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Resolve a local wall-clock time to an instant. A time that falls in a DST
/// gap resolves to the first valid time after it; an ambiguous time resolves
/// to its earlier occurrence.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN), tz)
}

/// `[midnight, next midnight)` of `date`.
pub fn day_window(date: NaiveDate, tz: Tz) -> Window {
    let max = match date.succ_opt() {
        Some(next) => start_of_day(next, tz),
        None => DateTime::<Utc>::MAX_UTC,
    };
    Window::new(start_of_day(date, tz), max)
}

/// Elapsed minutes between local midnight of the instant's day and the
/// instant, truncated towards zero.
pub fn minutes_of_day(instant: DateTime<Utc>, tz: Tz) -> i64 {
    let midnight = start_of_day(local_date(instant, tz), tz);
    (instant - midnight).num_minutes()
}

/// The instant `minutes` after local midnight of `date`.
pub fn at_minutes(date: NaiveDate, minutes: i64, tz: Tz) -> DateTime<Utc> {
    start_of_day(date, tz) + Duration::minutes(minutes)
}

/// Every local date whose day overlaps the window, in order.
pub fn days_overlapping(window: &Window, tz: Tz) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    if window.is_empty() {
        return days;
    }
    let mut date = local_date(window.min, tz);
    while start_of_day(date, tz) < window.max {
        days.push(date);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}
