//! Time range primitives shared by every other module.
//!
//! All ranges are half-open: `[start, end)`. Two ranges that touch
//! (`a.end == b.start`) do not intersect, but they do merge when coalescing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// Identifier of a sub-resource (a schedule a resource can be rostered onto).
pub type ScheduleId = u64;

/// Anything that occupies a span of time.
pub trait Timed {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;

    /// The span as a plain [`TimeRange`].
    fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start(),
            end: self.end(),
        }
    }
}

/// An immutable `[start, end)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let range = TimeRange { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(AvailabilityError::InvalidRange {
                start: self.start,
                end: self.end,
            })
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when the two ranges share at least one instant. Touching ranges
    /// do not intersect.
    pub fn intersects(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when the ranges overlap or touch, i.e. would coalesce.
    pub fn meets_or_overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The smallest range covering both.
    pub fn hull(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Truncate to the window. Returns `None` when nothing of the range is
    /// left inside it.
    pub fn clip(&self, window: &Window) -> Option<TimeRange> {
        clip_to(self.start, self.end, window)
    }
}

impl Timed for TimeRange {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// The overall bound of a query. `min >= max` is an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl Window {
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Window { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min >= self.max
    }

    pub fn as_range(&self) -> Option<TimeRange> {
        (!self.is_empty()).then_some(TimeRange {
            start: self.min,
            end: self.max,
        })
    }

    /// The part of this window that is also inside `other`.
    pub fn narrow(&self, other: &Window) -> Window {
        Window {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }
}

/// Truncate `[from, to)` to the window, dropping it when it ends up empty.
pub(crate) fn clip_to(from: DateTime<Utc>, to: DateTime<Utc>, window: &Window) -> Option<TimeRange> {
    let start = from.max(window.min);
    let end = to.min(window.max);
    (start < end).then_some(TimeRange { start, end })
}

/// A range tagged with the schedule it belongs to. Depending on the list it
/// sits in this is a free slot, a busy slot, a roster block or a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleRange {
    pub schedule: ScheduleId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScheduleRange {
    pub fn new(schedule: ScheduleId, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        TimeRange::new(start, end)?;
        Ok(ScheduleRange {
            schedule,
            start,
            end,
        })
    }

    pub fn from_range(schedule: ScheduleId, range: TimeRange) -> Self {
        ScheduleRange {
            schedule,
            start: range.start,
            end: range.end,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl Timed for ScheduleRange {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Workflow status of a booked event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Pending,
    Confirmed,
    CheckedIn,
    InProgress,
    Billed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A booked appointment.
    #[default]
    Appointment,
    /// A calendar block reserving time without a patient attached.
    Block,
}

/// A booked activity supplied by the event-query collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub kind: EventKind,
    /// Schedules this event books. Empty books every schedule of the resource.
    #[serde(default)]
    pub schedules: Vec<ScheduleId>,
}

impl Event {
    pub fn new(id: u64, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Event {
            id,
            start,
            end,
            status: EventStatus::default(),
            kind: EventKind::default(),
            schedules: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_schedules(mut self, schedules: impl IntoIterator<Item = ScheduleId>) -> Self {
        self.schedules = schedules.into_iter().collect();
        self
    }

    /// Cancelled events take part in no computation.
    pub fn is_active(&self) -> bool {
        self.status != EventStatus::Cancelled
    }

    pub fn is_blocking(&self) -> bool {
        self.kind == EventKind::Block
    }

    pub fn books(&self, schedule: ScheduleId) -> bool {
        self.schedules.is_empty() || self.schedules.contains(&schedule)
    }
}

impl Timed for Event {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Reject any item whose start is not before its end.
pub fn validate_ranges<T: Timed>(items: &[T]) -> Result<()> {
    items.iter().try_for_each(|item| item.range().validate())
}

/// Reject a sequence that is not sorted by start time. Equal starts are fine.
pub fn validate_sorted<T: Timed>(items: &[T]) -> Result<()> {
    match items.windows(2).position(|pair| pair[1].start() < pair[0].start()) {
        Some(i) => Err(AvailabilityError::UnsortedInput { index: i + 1 }),
        None => Ok(()),
    }
}

pub(crate) fn is_sorted_by_start<T: Timed>(items: &[T]) -> bool {
    items.is_sorted_by_key(|item| item.start())
}
