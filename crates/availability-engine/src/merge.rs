//! Merge a sub-resource's sorted ranges into covered runs and the gaps
//! between them, truncated to a window.
//!
//! The same pass serves both calendar flavours: a roster calendar reads the
//! covered runs as free time (the resource is rostered on) and the gaps as
//! busy; a schedule calendar reads booked appointments as covered (busy) and
//! the gaps within opening hours as free.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::interval::{
    clip_to, is_sorted_by_start, validate_ranges, validate_sorted, ScheduleId, ScheduleRange,
    TimeRange, Timed, Window,
};

/// Covered runs and the gaps between them, both sorted and non-overlapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub covered: Vec<TimeRange>,
    pub gaps: Vec<TimeRange>,
}

/// Free and busy ranges tagged with their schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBusy {
    pub free: Vec<ScheduleRange>,
    pub busy: Vec<ScheduleRange>,
}

impl FreeBusy {
    pub fn is_empty(&self) -> bool {
        self.free.is_empty() && self.busy.is_empty()
    }

    pub fn extend(&mut self, other: FreeBusy) {
        self.free.extend(other.free);
        self.busy.extend(other.busy);
    }
}

/// Validate and partition `ranges` over `window`.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` if any range has `start >= end`,
/// and `AvailabilityError::UnsortedInput` if the ranges are not sorted by
/// start time. Unsorted input is never re-sorted.
pub fn partition<T: Timed>(ranges: &[T], window: &Window) -> Result<Partition> {
    validate_ranges(ranges).inspect_err(|e| warn!("rejected ranges: {e}"))?;
    validate_sorted(ranges).inspect_err(|e| warn!("rejected ranges: {e}"))?;
    Ok(partition_sorted(ranges, window))
}

/// The roster reading of [`partition`]: rostered blocks are free, the rest of
/// the window is busy.
pub fn compute_free_busy<T: Timed>(
    schedule: ScheduleId,
    blocks: &[T],
    window: &Window,
) -> Result<FreeBusy> {
    let Partition { covered, gaps } = partition(blocks, window)?;
    Ok(FreeBusy {
        free: tag(schedule, covered),
        busy: tag(schedule, gaps),
    })
}

pub(crate) fn tag(schedule: ScheduleId, ranges: Vec<TimeRange>) -> Vec<ScheduleRange> {
    ranges
        .into_iter()
        .map(|range| ScheduleRange::from_range(schedule, range))
        .collect()
}

/// Partition ranges already known to be valid and sorted.
pub(crate) fn partition_sorted<T: Timed>(ranges: &[T], window: &Window) -> Partition {
    debug_assert!(is_sorted_by_start(ranges));

    let mut result = Partition::default();
    if window.is_empty() {
        return result;
    }

    let mut run: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    let mut gap_start = window.min;
    // None once some range reaches past the window end: no trailing gap.
    let mut gap_end = Some(window.max);

    for range in ranges {
        let (start, end) = (range.start(), range.end());

        if start > gap_start {
            push_clipped(&mut result.gaps, gap_start, start, window);
        }

        run = match run {
            Some((run_start, run_end)) if start <= run_end => Some((run_start, run_end.max(end))),
            Some((run_start, run_end)) => {
                push_clipped(&mut result.covered, run_start, run_end, window);
                Some((start, end))
            }
            None => Some((start, end)),
        };

        if end > gap_start {
            gap_start = end;
        }
        if gap_end.is_some_and(|max| end > max) {
            gap_end = None;
        }
    }

    if let Some((run_start, run_end)) = run {
        push_clipped(&mut result.covered, run_start, run_end, window);
    }
    if let Some(max) = gap_end {
        push_clipped(&mut result.gaps, gap_start, max, window);
    }
    result
}

fn push_clipped(
    out: &mut Vec<TimeRange>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    window: &Window,
) {
    if let Some(range) = clip_to(from, to, window) {
        out.push(range);
    }
}
