//! Day × slot grids over a list of events, for calendar rendering and slot
//! lookups.
//!
//! A [`DayGrid`] covers consecutive local days, each divided into slots from
//! `start_mins` to `end_mins`. A [`WindowedGrid`] restricts a base grid to a
//! subset of its slots and delegates every lookup to it.

use std::collections::HashSet;

use chrono::{Days, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::day::{at_minutes, day_window, local_date};
use crate::error::{AvailabilityError, Result};
use crate::interval::{validate_ranges, Event, TimeRange, Timed};
use crate::slots::{slot_minutes, SlotSize};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Shape of a [`DayGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub start_date: NaiveDate,
    pub days: u32,
    pub slot_size: SlotSize,
    /// Minutes after local midnight at which each day's first slot starts.
    pub start_mins: u32,
    /// Minutes after local midnight at which each day's last slot ends.
    pub end_mins: u32,
    /// Widen the bounds so every event falls inside the grid.
    #[serde(default)]
    pub fit_events: bool,
}

impl GridSpec {
    /// A whole-day grid.
    pub fn new(start_date: NaiveDate, days: u32, slot_size: SlotSize) -> Self {
        GridSpec {
            start_date,
            days,
            slot_size,
            start_mins: 0,
            end_mins: MINUTES_PER_DAY,
            fit_events: false,
        }
    }

    pub fn with_hours(mut self, start_mins: u32, end_mins: u32) -> Self {
        self.start_mins = start_mins;
        self.end_mins = end_mins;
        self
    }

    pub fn fit_events(mut self) -> Self {
        self.fit_events = true;
        self
    }
}

/// Lookups shared by a base grid and its windowed views.
pub trait SlotGrid {
    fn days(&self) -> u32;

    fn slots(&self) -> usize;

    fn slot_size(&self) -> SlotSize;

    /// Minutes after local midnight at which slot 0 starts.
    fn start_mins(&self) -> u32;

    /// The time span of a cell, or `None` outside the grid.
    fn slot_range(&self, day: u32, slot: usize) -> Option<TimeRange>;

    /// The event occupying a cell. Appointments win over calendar blocks;
    /// among several candidates the earliest start wins.
    fn event_at(&self, day: u32, slot: usize) -> Option<&Event>;

    fn end_mins(&self) -> u32 {
        self.start_mins() + self.slots() as u32 * self.slot_size().minutes()
    }

    fn slot_start_mins(&self, slot: usize) -> Option<u32> {
        (slot < self.slots()).then(|| self.start_mins() + slot as u32 * self.slot_size().minutes())
    }

    /// The slot containing `minutes` after midnight, or `None` outside the
    /// grid's hours.
    fn slot_index(&self, minutes: u32) -> Option<usize> {
        if minutes < self.start_mins() || minutes >= self.end_mins() {
            return None;
        }
        Some(((minutes - self.start_mins()) / self.slot_size().minutes()) as usize)
    }

    /// How many consecutive slots, starting at `slot`, the event occupying
    /// `slot` covers on that day. Zero for an empty cell.
    fn slots_spanned(&self, day: u32, slot: usize) -> usize {
        let Some(id) = self.event_at(day, slot).map(|event| event.id) else {
            return 0;
        };
        (slot..self.slots())
            .take_while(|&s| self.event_at(day, s).is_some_and(|event| event.id == id))
            .count()
    }

    /// The first empty cell at or after (`from_day`, `from_slot`), scanning
    /// slot by slot and then day by day.
    fn first_free_slot(&self, from_day: u32, from_slot: usize) -> Option<(u32, usize)> {
        (from_day..self.days()).find_map(|day| {
            let first = if day == from_day { from_slot } else { 0 };
            (first..self.slots())
                .find(|&slot| self.event_at(day, slot).is_none())
                .map(|slot| (day, slot))
        })
    }
}

/// Events projected onto consecutive days of slots.
#[derive(Debug, Clone)]
pub struct DayGrid {
    spec: GridSpec,
    tz: Tz,
    /// Active events, unique by id, sorted by start.
    events: Vec<Event>,
}

impl DayGrid {
    /// Build a grid. Cancelled events are dropped; an event id seen twice is
    /// registered once.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidRange` if any event ends before it
    /// starts, and `AvailabilityError::InvalidGridHours` unless
    /// `start_mins <= end_mins <= 1440`.
    pub fn new(spec: GridSpec, events: &[Event], tz: Tz) -> Result<Self> {
        if spec.start_mins > spec.end_mins || spec.end_mins > MINUTES_PER_DAY {
            warn!(
                start_mins = spec.start_mins,
                end_mins = spec.end_mins,
                "rejected grid hours"
            );
            return Err(AvailabilityError::InvalidGridHours {
                start_mins: spec.start_mins,
                end_mins: spec.end_mins,
            });
        }
        validate_ranges(events)?;

        let mut seen = HashSet::new();
        let mut events: Vec<Event> = events
            .iter()
            .filter(|event| event.is_active() && seen.insert(event.id))
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start);

        let mut spec = spec;
        if spec.fit_events {
            widen_to_events(&mut spec, &events, tz);
        }
        // Widen to slot boundaries, but never past the end of the day: a
        // trailing partial slot is dropped instead.
        let size = spec.slot_size.minutes();
        spec.start_mins = spec.start_mins / size * size;
        spec.end_mins = match spec.end_mins.div_ceil(size).checked_mul(size) {
            Some(end) if end <= MINUTES_PER_DAY => end,
            _ => spec.end_mins / size * size,
        };
        spec.end_mins = spec.end_mins.max(spec.start_mins);

        debug!(
            days = spec.days,
            start_mins = spec.start_mins,
            end_mins = spec.end_mins,
            events = events.len(),
            "built day grid"
        );
        Ok(DayGrid { spec, tz, events })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        if day >= self.spec.days {
            return None;
        }
        self.spec.start_date.checked_add_days(Days::new(u64::from(day)))
    }

    /// A view restricted to the slots covering `[start_minutes, end_minutes)`.
    ///
    /// The first slot is the one containing `start_minutes`. When
    /// `end_minutes` is a slot boundary the last slot is the one ending there,
    /// otherwise the one containing it; at or past the grid's end it is the
    /// grid's own last slot. A zero-width or inverted window collapses to
    /// that last slot.
    pub fn windowed(&self, start_minutes: u32, end_minutes: u32) -> WindowedGrid<'_> {
        let count = self.slots();
        if count == 0 {
            return WindowedGrid {
                base: self,
                first: 0,
                count: 0,
            };
        }
        let size = self.spec.slot_size.minutes();
        let (grid_start, grid_end) = (self.spec.start_mins, self.spec.end_mins);

        let last = if end_minutes >= grid_end {
            count - 1
        } else if end_minutes <= grid_start {
            0
        } else {
            let offset = end_minutes - grid_start;
            let index = (offset / size) as usize;
            if offset % size == 0 {
                index - 1
            } else {
                index
            }
        };
        let first = if start_minutes <= grid_start {
            0
        } else if start_minutes >= grid_end {
            count - 1
        } else {
            ((start_minutes - grid_start) / size) as usize
        };
        let first = first.min(last);

        WindowedGrid {
            base: self,
            first,
            count: last - first + 1,
        }
    }
}

impl SlotGrid for DayGrid {
    fn days(&self) -> u32 {
        self.spec.days
    }

    fn slots(&self) -> usize {
        ((self.spec.end_mins - self.spec.start_mins) / self.spec.slot_size.minutes()) as usize
    }

    fn slot_size(&self) -> SlotSize {
        self.spec.slot_size
    }

    fn start_mins(&self) -> u32 {
        self.spec.start_mins
    }

    fn slot_range(&self, day: u32, slot: usize) -> Option<TimeRange> {
        let date = self.date(day)?;
        let minutes = self.slot_start_mins(slot)?;
        let start = at_minutes(date, i64::from(minutes), self.tz);
        Some(TimeRange {
            start,
            end: start + self.spec.slot_size.duration(),
        })
    }

    fn event_at(&self, day: u32, slot: usize) -> Option<&Event> {
        let cell = self.slot_range(day, slot)?;
        let started = self.events.partition_point(|event| event.start < cell.end);
        let mut candidates = self.events[..started]
            .iter()
            .filter(|event| event.end > cell.start);
        let first = candidates.next()?;
        if !first.is_blocking() {
            return Some(first);
        }
        candidates.find(|event| !event.is_blocking()).or(Some(first))
    }
}

/// Widen the grid's hours so each event's slot-rounded times fall inside it.
/// An event running over midnight needs the whole day.
fn widen_to_events(spec: &mut GridSpec, events: &[Event], tz: Tz) {
    let Some(last_date) = spec
        .start_date
        .checked_add_days(Days::new(u64::from(spec.days)))
    else {
        return;
    };
    let span = TimeRange {
        start: day_window(spec.start_date, tz).min,
        end: day_window(last_date, tz).min,
    };
    for event in events.iter().filter(|event| span.start < span.end && event.range().intersects(&span)) {
        let last_instant = event.end - Duration::nanoseconds(1);
        let (start, end) = if local_date(event.start, tz) != local_date(last_instant, tz) {
            (0, MINUTES_PER_DAY)
        } else {
            let start = slot_minutes(event.start, spec.slot_size, tz, false);
            let end = slot_minutes(last_instant, spec.slot_size, tz, true);
            (start.max(0) as u32, end.max(0) as u32)
        };
        spec.start_mins = spec.start_mins.min(start);
        spec.end_mins = spec.end_mins.max(end);
    }
}

/// A contiguous run of a base grid's slots, re-indexed from zero.
#[derive(Debug, Clone, Copy)]
pub struct WindowedGrid<'a> {
    base: &'a DayGrid,
    first: usize,
    count: usize,
}

impl WindowedGrid<'_> {
    /// Index in the base grid of this view's slot 0.
    pub fn first_base_slot(&self) -> usize {
        self.first
    }
}

impl SlotGrid for WindowedGrid<'_> {
    fn days(&self) -> u32 {
        self.base.days()
    }

    fn slots(&self) -> usize {
        self.count
    }

    fn slot_size(&self) -> SlotSize {
        self.base.slot_size()
    }

    fn start_mins(&self) -> u32 {
        self.base.start_mins() + self.first as u32 * self.base.slot_size().minutes()
    }

    fn slot_range(&self, day: u32, slot: usize) -> Option<TimeRange> {
        (slot < self.count)
            .then(|| self.base.slot_range(day, self.first + slot))
            .flatten()
    }

    fn event_at(&self, day: u32, slot: usize) -> Option<&Event> {
        if slot >= self.count {
            return None;
        }
        self.base.event_at(day, self.first + slot)
    }
}
