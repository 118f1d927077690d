//! Online-booking helpers on top of free ranges.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::interval::{ScheduleId, ScheduleRange, TimeRange};
use crate::slots::{is_aligned, round_up, SlotSize};

/// A kind of appointment, sized in slots of the schedule it is booked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentType {
    pub id: u64,
    pub name: String,
    pub slots: u32,
    #[serde(default)]
    pub online: bool,
}

impl AppointmentType {
    /// Only types flagged for online booking and at least one slot long are
    /// offered to clients.
    pub fn is_bookable(&self) -> bool {
        self.online && self.slots > 0
    }

    pub fn duration(&self, slot_size: SlotSize) -> Duration {
        Duration::minutes(i64::from(slot_size.minutes()) * i64::from(self.slots))
    }
}

/// The earliest slot-aligned range of `slots` slots starting at or after
/// `after` that fits inside a single free range. Ties on start time go to
/// the lower schedule id.
pub fn first_available(
    free: &[ScheduleRange],
    after: DateTime<Utc>,
    slots: u32,
    slot_size: SlotSize,
    tz: Tz,
) -> Option<ScheduleRange> {
    if slots == 0 {
        return None;
    }
    let length = Duration::minutes(i64::from(slot_size.minutes()) * i64::from(slots));
    free.iter()
        .filter_map(|range| {
            let start = round_up(range.start.max(after), slot_size, tz);
            let end = start + length;
            (end <= range.end).then_some(ScheduleRange {
                schedule: range.schedule,
                start,
                end,
            })
        })
        .min_by_key(|candidate| (candidate.start, candidate.schedule))
}

/// Check a booking request: not in the past, non-empty, and starting and
/// ending on slot boundaries.
///
/// # Errors
/// Returns `AvailabilityError::BookingInPast`, `AvailabilityError::InvalidRange`
/// or `AvailabilityError::NotSlotAligned`.
pub fn validate_booking(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    slot_size: SlotSize,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<TimeRange> {
    if start < now {
        return Err(AvailabilityError::BookingInPast { start });
    }
    let range = TimeRange::new(start, end)?;
    for instant in [start, end] {
        if !is_aligned(instant, slot_size, tz) {
            return Err(AvailabilityError::NotSlotAligned { instant });
        }
    }
    Ok(range)
}

/// True when `range` lies entirely inside one of the schedule's free ranges.
pub fn is_available(free: &[ScheduleRange], schedule: ScheduleId, range: &TimeRange) -> bool {
    free.iter()
        .any(|f| f.schedule == schedule && f.start <= range.start && range.end <= f.end)
}
