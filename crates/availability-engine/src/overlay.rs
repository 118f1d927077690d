//! Overlay booked appointments onto roster-derived free and busy ranges.
//!
//! Both operations take start-sorted inputs and return a fresh list; neither
//! touches its arguments.

use crate::error::Result;
use crate::interval::{is_sorted_by_start, validate_ranges, validate_sorted, TimeRange};

/// Remove every booked interval from the free ranges.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` or `AvailabilityError::UnsortedInput`
/// if either list is invalid.
pub fn subtract(free: &[TimeRange], bookings: &[TimeRange]) -> Result<Vec<TimeRange>> {
    validate(free, bookings)?;
    Ok(subtract_sorted(free.to_vec(), bookings))
}

/// Merge every booked interval into the busy ranges, coalescing ranges that
/// overlap or touch.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` or `AvailabilityError::UnsortedInput`
/// if either list is invalid.
pub fn fold(busy: &[TimeRange], bookings: &[TimeRange]) -> Result<Vec<TimeRange>> {
    validate(busy, bookings)?;
    Ok(fold_sorted(busy.to_vec(), bookings))
}

fn validate(ranges: &[TimeRange], bookings: &[TimeRange]) -> Result<()> {
    validate_ranges(ranges)?;
    validate_sorted(ranges)?;
    validate_ranges(bookings)?;
    validate_sorted(bookings)
}

pub(crate) fn subtract_sorted(mut free: Vec<TimeRange>, bookings: &[TimeRange]) -> Vec<TimeRange> {
    debug_assert!(is_sorted_by_start(&free) && is_sorted_by_start(bookings));

    for booking in bookings {
        let mut next = Vec::with_capacity(free.len() + 1);
        let mut rest = free.into_iter();
        while let Some(range) = rest.next() {
            if booking.end <= range.start {
                // Every remaining free range starts later still.
                next.push(range);
                next.extend(rest.by_ref());
                break;
            }
            if booking.start >= range.end {
                next.push(range);
                continue;
            }
            // Keep whatever sticks out on either side of the booking. A
            // booking covering the whole range keeps nothing; an interior one
            // keeps both sides.
            if booking.start > range.start {
                next.push(TimeRange {
                    start: range.start,
                    end: booking.start,
                });
            }
            if booking.end < range.end {
                next.push(TimeRange {
                    start: booking.end,
                    end: range.end,
                });
            }
        }
        free = next;
    }
    free
}

pub(crate) fn fold_sorted(mut busy: Vec<TimeRange>, bookings: &[TimeRange]) -> Vec<TimeRange> {
    if bookings.is_empty() {
        return busy;
    }

    for booking in bookings {
        let mut found = false;
        for range in busy.iter_mut().filter(|range| range.intersects(booking)) {
            *range = range.hull(booking);
            found = true;
        }
        if !found {
            let index = busy
                .binary_search_by(|range| range.start.cmp(&booking.start))
                .unwrap_or_else(|index| index);
            busy.insert(index, *booking);
        }
    }

    // Expanding each intersected range separately leaves chains of three or
    // more overlapping ranges, so coalesce in one more pass.
    debug_assert!(is_sorted_by_start(&busy));
    coalesce(busy)
}

/// Merge consecutive start-sorted ranges that overlap or touch.
pub fn coalesce(ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    let mut result: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match result.last_mut() {
            Some(last) if last.meets_or_overlaps(&range) => *last = last.hull(&range),
            _ => result.push(range),
        }
    }
    result
}
