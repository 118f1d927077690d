//! Day-by-day free/busy calendars built from the merge engine and the
//! appointment overlay.
//!
//! Two calendars are provided:
//!
//! - [`RosterCalendar`]: a resource (e.g. a clinician) rostered onto one or
//!   more schedules. Roster blocks are free time, the rest of each day is
//!   busy, and booked appointments move time from free to busy.
//! - [`ScheduleCalendar`]: a single schedule with weekly opening hours.
//!   Appointments are busy time, the rest of the opening hours is free.
//!
//! Roster blocks must arrive sorted by start time (`UnsortedInput` otherwise).
//! Appointments come from an event query that promises no order, so they are
//! stable-sorted here before use.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::day::{day_window, days_overlapping, resolve_local, start_of_day};
use crate::error::Result;
use crate::interval::{
    validate_ranges, validate_sorted, Event, ScheduleId, ScheduleRange, TimeRange, Timed, Window,
};
use crate::merge::{partition_sorted, tag, FreeBusy};
use crate::overlay::{fold_sorted, subtract_sorted};
use crate::slots::{split, SlotSize};

/// Active events, sorted by start.
fn active_sorted(events: &[Event]) -> Result<Vec<&Event>> {
    validate_ranges(events).inspect_err(|e| warn!("rejected events: {e}"))?;
    let mut active: Vec<&Event> = events.iter().filter(|event| event.is_active()).collect();
    active.sort_by_key(|event| event.start);
    Ok(active)
}

fn clip_all<'a, T: Timed + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    window: &Window,
) -> Vec<TimeRange> {
    items
        .into_iter()
        .filter_map(|item| item.range().clip(window))
        .collect()
}

fn split_if(free_busy: FreeBusy, slot_size: Option<SlotSize>, tz: Tz) -> FreeBusy {
    match slot_size {
        Some(size) => FreeBusy {
            free: split(&free_busy.free, size, tz),
            busy: split(&free_busy.busy, size, tz),
        },
        None => free_busy,
    }
}

/// Free/busy time of a rostered resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterCalendar {
    tz: Tz,
    slot_size: Option<SlotSize>,
}

impl RosterCalendar {
    pub fn new(tz: Tz) -> Self {
        RosterCalendar {
            tz,
            slot_size: None,
        }
    }

    /// Split every result range into slots of this size.
    pub fn with_slots(mut self, slot_size: SlotSize) -> Self {
        self.slot_size = Some(slot_size);
        self
    }

    /// Compute free and busy ranges for every schedule the resource is
    /// rostered onto, day by day. Results are ordered by day, then by
    /// schedule (in order of first appearance in the roster), then by start.
    ///
    /// An appointment books the schedules it names, or every schedule when it
    /// names none.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidRange` for an invalid roster block
    /// or appointment, and `AvailabilityError::UnsortedInput` for an unsorted
    /// roster.
    pub fn free_busy(
        &self,
        roster: &[ScheduleRange],
        appointments: &[Event],
        window: &Window,
    ) -> Result<FreeBusy> {
        validate_ranges(roster).inspect_err(|e| warn!("rejected roster: {e}"))?;
        validate_sorted(roster).inspect_err(|e| warn!("rejected roster: {e}"))?;
        let appointments = active_sorted(appointments)?;

        let mut schedules: Vec<(ScheduleId, Vec<ScheduleRange>)> = Vec::new();
        for block in roster {
            match schedules.iter_mut().find(|(id, _)| *id == block.schedule) {
                Some((_, blocks)) => blocks.push(*block),
                None => schedules.push((block.schedule, vec![*block])),
            }
        }

        let mut result = FreeBusy::default();
        for date in days_overlapping(window, self.tz) {
            let day = day_window(date, self.tz).narrow(window);
            for (schedule, blocks) in &schedules {
                let blocks = clip_all(blocks, &day);
                let bookings = clip_all(
                    appointments.iter().copied().filter(|event| event.books(*schedule)),
                    &day,
                );
                let partition = partition_sorted(&blocks, &day);
                let free = subtract_sorted(partition.covered, &bookings);
                let busy = fold_sorted(partition.gaps, &bookings);
                debug!(
                    %date,
                    schedule,
                    free = free.len(),
                    busy = busy.len(),
                    "roster day computed"
                );
                result.free.extend(tag(*schedule, free));
                result.busy.extend(tag(*schedule, busy));
            }
        }
        Ok(split_if(result, self.slot_size, self.tz))
    }

    pub fn free(
        &self,
        roster: &[ScheduleRange],
        appointments: &[Event],
        window: &Window,
    ) -> Result<Vec<ScheduleRange>> {
        Ok(self.free_busy(roster, appointments, window)?.free)
    }

    pub fn busy(
        &self,
        roster: &[ScheduleRange],
        appointments: &[Event],
        window: &Window,
    ) -> Result<Vec<ScheduleRange>> {
        Ok(self.free_busy(roster, appointments, window)?.busy)
    }
}

/// Opening hours of one weekday. A missing `open` means midnight, a missing
/// `close` means the following midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default)]
    pub open: Option<NaiveTime>,
    #[serde(default)]
    pub close: Option<NaiveTime>,
}

impl DayHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        DayHours {
            open: Some(open),
            close: Some(close),
        }
    }

    pub fn all_day() -> Self {
        DayHours::default()
    }
}

/// Weekly opening hours. A `None` day is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub mon: Option<DayHours>,
    #[serde(default)]
    pub tue: Option<DayHours>,
    #[serde(default)]
    pub wed: Option<DayHours>,
    #[serde(default)]
    pub thu: Option<DayHours>,
    #[serde(default)]
    pub fri: Option<DayHours>,
    #[serde(default)]
    pub sat: Option<DayHours>,
    #[serde(default)]
    pub sun: Option<DayHours>,
}

impl OpeningHours {
    /// The same hours every day of the week.
    pub fn daily(hours: DayHours) -> Self {
        OpeningHours {
            mon: Some(hours),
            tue: Some(hours),
            wed: Some(hours),
            thu: Some(hours),
            fri: Some(hours),
            sat: Some(hours),
            sun: Some(hours),
        }
    }

    pub fn with_day(mut self, weekday: Weekday, hours: Option<DayHours>) -> Self {
        *self.day_mut(weekday) = hours;
        self
    }

    pub fn for_weekday(&self, weekday: Weekday) -> Option<DayHours> {
        match weekday {
            Weekday::Mon => self.mon,
            Weekday::Tue => self.tue,
            Weekday::Wed => self.wed,
            Weekday::Thu => self.thu,
            Weekday::Fri => self.fri,
            Weekday::Sat => self.sat,
            Weekday::Sun => self.sun,
        }
    }

    fn day_mut(&mut self, weekday: Weekday) -> &mut Option<DayHours> {
        match weekday {
            Weekday::Mon => &mut self.mon,
            Weekday::Tue => &mut self.tue,
            Weekday::Wed => &mut self.wed,
            Weekday::Thu => &mut self.thu,
            Weekday::Fri => &mut self.fri,
            Weekday::Sat => &mut self.sat,
            Weekday::Sun => &mut self.sun,
        }
    }

    /// The open window on `date`, or `None` when closed.
    pub fn window(&self, date: NaiveDate, tz: Tz) -> Option<Window> {
        let hours = self.for_weekday(date.weekday())?;
        let day = day_window(date, tz);
        let min = hours
            .open
            .map_or(start_of_day(date, tz), |open| resolve_local(date.and_time(open), tz));
        let max = hours
            .close
            .map_or(day.max, |close| resolve_local(date.and_time(close), tz));
        Some(Window::new(min, max))
    }
}

/// Free/busy time of a schedule open for booking during weekly hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleCalendar {
    tz: Tz,
    slot_size: Option<SlotSize>,
}

impl ScheduleCalendar {
    pub fn new(tz: Tz) -> Self {
        ScheduleCalendar {
            tz,
            slot_size: None,
        }
    }

    pub fn with_slots(mut self, slot_size: SlotSize) -> Self {
        self.slot_size = Some(slot_size);
        self
    }

    /// Compute free and busy ranges of `schedule` inside its opening hours,
    /// day by day. Appointments booking other schedules are ignored.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidRange` for an invalid appointment.
    pub fn free_busy(
        &self,
        schedule: ScheduleId,
        hours: &OpeningHours,
        appointments: &[Event],
        window: &Window,
    ) -> Result<FreeBusy> {
        let appointments: Vec<&Event> = active_sorted(appointments)?
            .into_iter()
            .filter(|event| event.books(schedule))
            .collect();

        let mut result = FreeBusy::default();
        for date in days_overlapping(window, self.tz) {
            let Some(open) = hours.window(date, self.tz) else {
                debug!(%date, schedule, "closed");
                continue;
            };
            let open = open.narrow(window);
            let Some(open_range) = open.as_range() else {
                continue;
            };
            let events: Vec<TimeRange> = appointments
                .iter()
                .map(|event| event.range())
                .filter(|range| range.intersects(&open_range))
                .collect();
            let partition = partition_sorted(&events, &open);
            debug!(
                %date,
                schedule,
                free = partition.gaps.len(),
                busy = partition.covered.len(),
                "schedule day computed"
            );
            result.free.extend(tag(schedule, partition.gaps));
            result.busy.extend(tag(schedule, partition.covered));
        }
        Ok(split_if(result, self.slot_size, self.tz))
    }
}
