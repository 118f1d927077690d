//! Slot-boundary rounding and splitting of ranges into fixed-size slots.
//!
//! Slot boundaries are multiples of the slot size measured from local
//! midnight of the instant's own day.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::day::{day_window, days_overlapping, local_date, start_of_day};
use crate::error::{AvailabilityError, Result};
use crate::interval::{ScheduleRange, TimeRange, Window};

/// A slot length in whole minutes, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlotSize(u32);

impl SlotSize {
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(AvailabilityError::InvalidSlotSize(minutes));
        }
        Ok(SlotSize(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }

    fn seconds(self) -> i64 {
        i64::from(self.0) * 60
    }
}

impl TryFrom<u32> for SlotSize {
    type Error = AvailabilityError;

    fn try_from(minutes: u32) -> Result<Self> {
        SlotSize::new(minutes)
    }
}

impl From<SlotSize> for u32 {
    fn from(size: SlotSize) -> u32 {
        size.0
    }
}

/// Where `instant` sits relative to its day's slot boundaries: the boundary at
/// or before it, and whether it is exactly on that boundary.
fn floor_boundary(instant: DateTime<Utc>, slot: SlotSize, tz: Tz) -> (DateTime<Utc>, bool) {
    let midnight = start_of_day(local_date(instant, tz), tz);
    let offset = instant - midnight;
    let secs = offset.num_seconds();
    let whole = offset == Duration::seconds(secs);
    let floor = secs.div_euclid(slot.seconds()) * slot.seconds();
    (midnight + Duration::seconds(floor), whole && floor == secs)
}

/// The slot boundary at or before `instant`.
pub fn round_down(instant: DateTime<Utc>, slot: SlotSize, tz: Tz) -> DateTime<Utc> {
    floor_boundary(instant, slot, tz).0
}

/// The slot boundary at or after `instant`.
pub fn round_up(instant: DateTime<Utc>, slot: SlotSize, tz: Tz) -> DateTime<Utc> {
    match floor_boundary(instant, slot, tz) {
        (boundary, true) => boundary,
        (boundary, false) => boundary + slot.duration(),
    }
}

pub fn is_aligned(instant: DateTime<Utc>, slot: SlotSize, tz: Tz) -> bool {
    floor_boundary(instant, slot, tz).1
}

/// Minutes from local midnight to the instant's slot boundary, rounding up or
/// down. Used to place events on a day grid.
pub fn slot_minutes(instant: DateTime<Utc>, slot: SlotSize, tz: Tz, up: bool) -> i64 {
    let boundary = if up {
        round_up(instant, slot, tz)
    } else {
        round_down(instant, slot, tz)
    };
    let midnight = start_of_day(local_date(instant, tz), tz);
    (boundary - midnight).num_minutes()
}

/// Slice one range into whole slots. The start is rounded up and the end
/// rounded down to slot boundaries; a partial slot at either edge is dropped.
/// The range is cut at each local midnight first, so no slot spans two days.
pub fn split_range(range: TimeRange, slot: SlotSize, tz: Tz) -> Vec<TimeRange> {
    days_overlapping(&Window::new(range.start, range.end), tz)
        .into_iter()
        .filter_map(|date| range.clip(&day_window(date, tz)))
        .flat_map(|day| split_within_day(day, slot, tz))
        .collect()
}

fn split_within_day(range: TimeRange, slot: SlotSize, tz: Tz) -> Vec<TimeRange> {
    let mut slots = Vec::new();
    let end = round_down(range.end, slot, tz);
    let mut from = round_up(range.start, slot, tz);
    while from < end {
        let to = from + slot.duration();
        if to > end {
            break;
        }
        slots.push(TimeRange { start: from, end: to });
        from = to;
    }
    slots
}

/// Slice every range into slots, keeping each slot's schedule.
pub fn split(ranges: &[ScheduleRange], slot: SlotSize, tz: Tz) -> Vec<ScheduleRange> {
    ranges
        .iter()
        .flat_map(|range| {
            split_range(
                TimeRange {
                    start: range.start,
                    end: range.end,
                },
                slot,
                tz,
            )
            .into_iter()
            .map(move |piece| ScheduleRange::from_range(range.schedule, piece))
        })
        .collect()
}
