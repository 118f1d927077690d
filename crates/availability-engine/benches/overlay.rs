use std::hint::black_box;

use availability_engine::calendar::RosterCalendar;
use availability_engine::interval::{Event, ScheduleRange, TimeRange, Window};
use availability_engine::merge::partition;
use availability_engine::overlay::{fold, subtract};
use availability_engine::slots::SlotSize;
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{criterion_group, criterion_main, Criterion};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// Four weeks of 08:00-12:00 and 13:00-18:00 shifts.
fn shifts() -> Vec<TimeRange> {
    (0..28)
        .flat_map(|day| {
            let midnight = base() + Duration::days(day);
            [(8, 12), (13, 18)].map(|(from, to)| TimeRange {
                start: midnight + Duration::hours(from),
                end: midnight + Duration::hours(to),
            })
        })
        .collect()
}

/// A 20 minute appointment every 40 minutes through each shift.
fn bookings() -> Vec<TimeRange> {
    shifts()
        .iter()
        .flat_map(|shift| {
            let count = (shift.end - shift.start).num_minutes() / 40;
            (0..count).map(move |i| {
                let start = shift.start + Duration::minutes(i * 40);
                TimeRange {
                    start,
                    end: start + Duration::minutes(20),
                }
            })
        })
        .collect()
}

fn window() -> Window {
    Window::new(base(), base() + Duration::days(28))
}

fn bench_overlay(c: &mut Criterion) {
    let shifts = shifts();
    let bookings = bookings();
    let window = window();
    let merged = partition(&shifts, &window).unwrap();

    c.bench_function("partition_four_weeks", |b| {
        b.iter(|| partition(black_box(&shifts), black_box(&window)).unwrap())
    });
    c.bench_function("subtract_bookings", |b| {
        b.iter(|| subtract(black_box(&merged.covered), black_box(&bookings)).unwrap())
    });
    c.bench_function("fold_bookings", |b| {
        b.iter(|| fold(black_box(&merged.gaps), black_box(&bookings)).unwrap())
    });
}

fn bench_roster(c: &mut Criterion) {
    let roster: Vec<ScheduleRange> = shifts()
        .into_iter()
        .enumerate()
        .map(|(i, range)| ScheduleRange::from_range(1 + (i % 2) as u64, range))
        .collect();
    let appointments: Vec<Event> = bookings()
        .into_iter()
        .enumerate()
        .map(|(i, range)| Event::new(i as u64, range.start, range.end))
        .collect();
    let window = window();
    let tz: Tz = "Australia/Melbourne".parse().unwrap();
    let calendar = RosterCalendar::new(tz).with_slots(SlotSize::new(15).unwrap());

    c.bench_function("roster_free_busy_four_weeks", |b| {
        b.iter(|| {
            calendar
                .free_busy(black_box(&roster), black_box(&appointments), black_box(&window))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_overlay, bench_roster);
criterion_main!(benches);
