//! Tests for the day/slot grid and its windowed views.

use availability_engine::error::AvailabilityError;
use availability_engine::grid::{DayGrid, GridSpec, SlotGrid};
use availability_engine::interval::{Event, EventKind, EventStatus};
use availability_engine::slots::SlotSize;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn mon(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn tue(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 17, hour, min, 0).unwrap()
}

fn fifteen() -> SlotSize {
    SlotSize::new(15).unwrap()
}

fn whole_days(days: u32, events: &[Event]) -> DayGrid {
    DayGrid::new(GridSpec::new(monday(), days, fifteen()), events, Tz::UTC).unwrap()
}

#[test]
fn slot_index_maps_minutes_to_slots() {
    let grid = whole_days(1, &[]);

    assert_eq!(grid.slots(), 96);
    assert_eq!(grid.slot_index(0), Some(0));
    assert_eq!(grid.slot_index(540), Some(36));
    assert_eq!(grid.slot_index(554), Some(36));
    assert_eq!(grid.slot_index(1439), Some(95));
    assert_eq!(grid.slot_index(1440), None);
}

#[test]
fn slot_index_outside_configured_hours_is_none() {
    let spec = GridSpec::new(monday(), 1, fifteen()).with_hours(8 * 60, 18 * 60);
    let grid = DayGrid::new(spec, &[], Tz::UTC).unwrap();

    assert_eq!(grid.slots(), 40);
    assert_eq!(grid.slot_index(479), None);
    assert_eq!(grid.slot_index(480), Some(0));
    assert_eq!(grid.slot_index(1079), Some(39));
    assert_eq!(grid.slot_index(1080), None);
    assert_eq!(grid.slot_start_mins(4), Some(540));
}

#[test]
fn unaligned_hours_are_widened_to_slot_boundaries() {
    let spec = GridSpec::new(monday(), 1, fifteen()).with_hours(8 * 60 + 10, 17 * 60 + 50);
    let grid = DayGrid::new(spec, &[], Tz::UTC).unwrap();

    assert_eq!(grid.start_mins(), 480);
    assert_eq!(grid.end_mins(), 18 * 60);
}

#[test]
fn hours_running_past_midnight_are_rejected() {
    let spec = GridSpec::new(monday(), 1, fifteen()).with_hours(0, 3000);
    let events = [Event::new(1, tue(0, 0), tue(1, 40))];

    let err = DayGrid::new(spec, &events, Tz::UTC).unwrap_err();
    assert_eq!(
        err,
        AvailabilityError::InvalidGridHours {
            start_mins: 0,
            end_mins: 3000
        }
    );
}

#[test]
fn huge_end_with_uneven_slot_is_an_error_not_an_overflow() {
    let seven = SlotSize::new(7).unwrap();
    let spec = GridSpec::new(monday(), 1, seven).with_hours(0, u32::MAX);

    let err = DayGrid::new(spec, &[], Tz::UTC).unwrap_err();
    assert!(matches!(err, AvailabilityError::InvalidGridHours { .. }));
}

#[test]
fn reversed_hours_are_rejected() {
    let spec = GridSpec::new(monday(), 1, fifteen()).with_hours(600, 500);

    let err = DayGrid::new(spec, &[], Tz::UTC).unwrap_err();
    assert_eq!(
        err,
        AvailabilityError::InvalidGridHours {
            start_mins: 600,
            end_mins: 500
        }
    );
}

#[test]
fn uneven_slot_drops_the_partial_slot_before_midnight() {
    let seven = SlotSize::new(7).unwrap();
    let events = [Event::new(1, mon(23, 50), tue(0, 30))];
    let grid = DayGrid::new(GridSpec::new(monday(), 1, seven), &events, Tz::UTC).unwrap();

    assert_eq!(grid.end_mins(), 1435);
    assert_eq!(grid.slots(), 205);
    assert_eq!(grid.slot_index(1439), None);
    assert_eq!(grid.event_at(0, 204).map(|e| e.id), Some(1));
    assert_eq!(grid.event_at(0, 205), None);
}

#[test]
fn event_is_found_in_every_slot_it_intersects() {
    let grid = whole_days(1, &[Event::new(1, mon(9, 0), mon(9, 30))]);

    assert_eq!(grid.event_at(0, 35), None);
    assert_eq!(grid.event_at(0, 36).map(|e| e.id), Some(1));
    assert_eq!(grid.event_at(0, 37).map(|e| e.id), Some(1));
    assert_eq!(grid.event_at(0, 38), None);
}

#[test]
fn event_partially_covering_a_slot_occupies_it() {
    let grid = whole_days(1, &[Event::new(1, mon(9, 10), mon(9, 20))]);

    assert_eq!(grid.event_at(0, 36).map(|e| e.id), Some(1));
    assert_eq!(grid.event_at(0, 37).map(|e| e.id), Some(1));
}

#[test]
fn event_over_midnight_is_found_on_both_days() {
    let grid = whole_days(2, &[Event::new(5, mon(23, 0), tue(1, 0))]);

    assert_eq!(grid.event_at(0, 92).map(|e| e.id), Some(5));
    assert_eq!(grid.event_at(0, 95).map(|e| e.id), Some(5));
    assert_eq!(grid.event_at(1, 0).map(|e| e.id), Some(5));
    assert_eq!(grid.event_at(1, 3).map(|e| e.id), Some(5));
    assert_eq!(grid.event_at(1, 4), None);
    assert_eq!(grid.events().len(), 1);
}

#[test]
fn duplicate_event_is_registered_once() {
    let event = Event::new(5, mon(23, 0), tue(1, 0));
    let grid = whole_days(2, &[event.clone(), event]);

    assert_eq!(grid.events().len(), 1);
}

#[test]
fn cancelled_event_is_ignored() {
    let cancelled = Event::new(1, mon(9, 0), mon(10, 0)).with_status(EventStatus::Cancelled);
    let grid = whole_days(1, &[cancelled]);

    assert!(grid.events().is_empty());
    assert_eq!(grid.event_at(0, 36), None);
}

#[test]
fn appointment_wins_over_calendar_block() {
    let block = Event::new(1, mon(9, 0), mon(12, 0)).with_kind(EventKind::Block);
    let appointment = Event::new(2, mon(10, 0), mon(10, 30));
    let grid = whole_days(1, &[block, appointment]);

    assert_eq!(grid.event_at(0, 36).map(|e| e.id), Some(1));
    assert_eq!(grid.event_at(0, 40).map(|e| e.id), Some(2));
    assert_eq!(grid.event_at(0, 42).map(|e| e.id), Some(1));
}

#[test]
fn out_of_range_cells_are_empty() {
    let grid = whole_days(1, &[Event::new(1, mon(0, 0), tue(0, 0))]);

    assert!(grid.event_at(0, 0).is_some());
    assert_eq!(grid.event_at(1, 0), None);
    assert_eq!(grid.event_at(0, 96), None);
}

#[test]
fn slots_spanned_counts_remaining_slots_of_the_event() {
    let grid = whole_days(
        2,
        &[
            Event::new(1, mon(9, 0), mon(9, 30)),
            Event::new(2, mon(23, 0), tue(1, 0)),
        ],
    );

    assert_eq!(grid.slots_spanned(0, 36), 2);
    assert_eq!(grid.slots_spanned(0, 37), 1);
    assert_eq!(grid.slots_spanned(0, 38), 0);
    assert_eq!(grid.slots_spanned(0, 92), 4);
    assert_eq!(grid.slots_spanned(1, 0), 4);
}

#[test]
fn first_free_slot_skips_occupied_cells_and_days() {
    let grid = whole_days(
        2,
        &[
            Event::new(1, mon(9, 0), mon(9, 30)),
            Event::new(2, mon(9, 30), tue(0, 15)),
        ],
    );

    assert_eq!(grid.first_free_slot(0, 36), Some((1, 1)));
    assert_eq!(grid.first_free_slot(0, 0), Some((0, 0)));
}

#[test]
fn fit_events_widens_hours_to_include_events() {
    let spec = GridSpec::new(monday(), 1, fifteen())
        .with_hours(9 * 60, 17 * 60)
        .fit_events();
    let events = [
        Event::new(1, mon(7, 50), mon(8, 20)),
        Event::new(2, mon(17, 0), mon(17, 40)),
    ];

    let grid = DayGrid::new(spec, &events, Tz::UTC).unwrap();

    assert_eq!(grid.start_mins(), 7 * 60 + 45);
    assert_eq!(grid.end_mins(), 17 * 60 + 45);
    assert_eq!(grid.event_at(0, 0).map(|e| e.id), Some(1));
}

#[test]
fn fit_events_ignores_events_outside_the_grid_days() {
    let spec = GridSpec::new(monday(), 1, fifteen())
        .with_hours(9 * 60, 17 * 60)
        .fit_events();
    let events = [Event::new(1, tue(6, 0), tue(7, 0))];

    let grid = DayGrid::new(spec, &events, Tz::UTC).unwrap();

    assert_eq!(grid.start_mins(), 9 * 60);
    assert_eq!(grid.end_mins(), 17 * 60);
}

// ── windowed views ──────────────────────────────────────────────────────────

#[test]
fn zero_width_window_on_a_boundary_resolves_to_the_slot_ending_there() {
    let grid = whole_days(1, &[]);

    let view = grid.windowed(540, 540);

    assert_eq!(view.slots(), 1);
    assert_eq!(view.first_base_slot(), 35);
    assert_eq!(view.start_mins(), 525);
    assert_eq!(view.end_mins(), 540);
}

#[test]
fn window_ending_on_a_boundary_excludes_the_following_slot() {
    let grid = whole_days(1, &[Event::new(1, mon(9, 0), mon(9, 30))]);

    let view = grid.windowed(540, 600);

    assert_eq!(view.slots(), 4);
    assert_eq!(view.start_mins(), 540);
    assert_eq!(view.event_at(0, 0).map(|e| e.id), Some(1));
    assert_eq!(view.event_at(0, 1).map(|e| e.id), Some(1));
    assert_eq!(view.event_at(0, 2), None);
    assert_eq!(view.event_at(0, 4), None);
    assert_eq!(view.slot_index(540), Some(0));
    assert_eq!(view.slot_index(600), None);
}

#[test]
fn window_ending_inside_a_slot_includes_that_slot() {
    let grid = whole_days(1, &[]);

    let view = grid.windowed(545, 605);

    assert_eq!(view.first_base_slot(), 36);
    assert_eq!(view.slots(), 5);
}

#[test]
fn window_ending_at_grid_end_uses_the_last_slot() {
    let grid = whole_days(1, &[]);

    for end in [1440, 2000] {
        let view = grid.windowed(1380, end);
        assert_eq!(view.first_base_slot(), 92);
        assert_eq!(view.slots(), 4);
        assert_eq!(view.end_mins(), 1440);
    }
}

#[test]
fn windowed_view_reindexes_slots_and_delegates_lookups() {
    let grid = whole_days(2, &[Event::new(2, mon(23, 0), tue(1, 0))]);

    let view = grid.windowed(0, 120);

    assert_eq!(view.slots(), 8);
    assert_eq!(view.event_at(1, 3).map(|e| e.id), Some(2));
    assert_eq!(view.slots_spanned(1, 0), 4);
    assert_eq!(view.slot_range(1, 0).map(|r| r.start), Some(tue(0, 0)));
    assert_eq!(view.first_free_slot(1, 0), Some((1, 4)));
}
