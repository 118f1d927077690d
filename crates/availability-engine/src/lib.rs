//! # availability-engine
//!
//! Free/busy interval algebra for appointment scheduling.
//!
//! Given a resource's roster blocks or opening hours and its booked events over
//! a date range, the engine computes free and busy time per schedule, truncated
//! at window and day boundaries, and projects it onto fixed-size slots for
//! calendar grids and online-booking slot discovery. Everything is a pure
//! function of its inputs; local-day questions take an explicit time zone.
//!
//! ## Modules
//!
//! - [`interval`]: `TimeRange`, `Window`, `ScheduleRange`, `Event`
//! - [`day`]: local midnight and minutes-of-day in a given time zone
//! - [`merge`]: sorted ranges → merged runs and the gaps between them
//! - [`overlay`]: subtract bookings from free time, fold them into busy time
//! - [`slots`]: slot-boundary rounding and splitting
//! - [`grid`]: day × slot grids and windowed views
//! - [`calendar`]: roster and opening-hours calendars, day by day
//! - [`booking`]: first available slot, booking request checks
//! - [`error`]: Error types

pub mod booking;
pub mod calendar;
pub mod day;
pub mod error;
pub mod grid;
pub mod interval;
pub mod merge;
pub mod overlay;
pub mod slots;

pub use booking::{first_available, validate_booking, AppointmentType};
pub use calendar::{DayHours, OpeningHours, RosterCalendar, ScheduleCalendar};
pub use error::AvailabilityError;
pub use grid::{DayGrid, GridSpec, SlotGrid, WindowedGrid};
pub use interval::{Event, EventKind, EventStatus, ScheduleId, ScheduleRange, TimeRange, Window};
pub use merge::{compute_free_busy, partition, FreeBusy, Partition};
pub use overlay::{fold, subtract};
pub use slots::{split, SlotSize};
