//! `availability` CLI: free/busy ranges, open slots and slot grids from
//! roster and appointment JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Free/busy of a rostered clinician (stdin → stdout)
//! availability roster < roster.json
//!
//! # Same, split into 15 minute slots in Melbourne local time
//! availability --tz Australia/Melbourne --slot-size 15 roster --split -i roster.json
//!
//! # Free/busy of a schedule with opening hours, written to a file
//! availability schedule -i schedule.json -o free-busy.json
//!
//! # First opening of two slots after a given instant
//! availability next-slot -i roster.json --after 2026-03-16T09:00:00Z --slots 2
//!
//! # Check a booking request against the roster
//! availability check -i roster.json --schedule 1 --start 2026-03-16T10:00:00Z --end 2026-03-16T10:30:00Z
//!
//! # Text grid of two days of events, 08:00 to 18:00
//! availability grid -i events.json --date 2026-03-16 --days 2 --start-mins 480 --end-mins 1080
//! ```
//!
//! `--tz`, `--slot-size` and `--log-level` fall back to `AVAILABILITY_TZ`,
//! `AVAILABILITY_SLOT_SIZE` and `AVAILABILITY_LOG`.

mod render;
mod request;
mod settings;

use anyhow::{Context, Result};
use availability_engine::booking::is_available;
use availability_engine::{
    first_available, validate_booking, DayGrid, GridSpec, RosterCalendar, ScheduleCalendar,
    ScheduleId, SlotGrid,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Read};
use tracing::{debug, info};

use crate::render::render_grid;
use crate::request::{parse, GridRequest, RosterRequest, ScheduleRequest};
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "availability",
    version,
    about = "Free/busy and slot availability for rostered schedules"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Free/busy ranges of a rostered resource
    Roster {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Split every range into slots
        #[arg(long)]
        split: bool,
    },
    /// Free/busy ranges of a schedule with opening hours
    Schedule {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Split every range into slots
        #[arg(long)]
        split: bool,
    },
    /// First slot-aligned opening in a resource's free time
    NextSlot {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Earliest start to consider (RFC 3339)
        #[arg(long)]
        after: DateTime<Utc>,
        /// Length of the opening in slots (defaults to the request's
        /// appointment type)
        #[arg(long)]
        slots: Option<u32>,
    },
    /// Check whether a booking request fits the resource's free time
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Schedule to book
        #[arg(long)]
        schedule: ScheduleId,
        /// Booking start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Booking end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Current instant (RFC 3339); defaults to the system clock
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Render events as a day × slot text grid
    Grid {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First day of the grid (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Number of days
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Minutes after midnight at which each day starts
        #[arg(long, default_value_t = 0)]
        start_mins: u32,
        /// Minutes after midnight at which each day ends
        #[arg(long, default_value_t = 24 * 60)]
        end_mins: u32,
        /// Widen the day to include every event
        #[arg(long)]
        fit_events: bool,
        /// Show only the slots from this minute of the day
        #[arg(long, requires = "to_mins")]
        from_mins: Option<u32>,
        /// Show only the slots up to this minute of the day
        #[arg(long, requires = "from_mins")]
        to_mins: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings;
    settings.init_logging();
    debug!(tz = %settings.tz, slot_size = settings.slot_size.minutes(), "settings resolved");

    match cli.command {
        Commands::Roster {
            input,
            output,
            split,
        } => {
            let req: RosterRequest = parse(&read_input(input.as_deref())?, "roster")?;
            let calendar = roster_calendar(&settings, split);
            let result = calendar
                .free_busy(&req.roster, &req.appointments, &req.window)
                .context("Failed to compute roster free/busy")?;
            info!(free = result.free.len(), busy = result.busy.len(), "roster computed");
            write_json(output.as_deref(), &result)?;
        }
        Commands::Schedule {
            input,
            output,
            split,
        } => {
            let req: ScheduleRequest = parse(&read_input(input.as_deref())?, "schedule")?;
            let mut calendar = ScheduleCalendar::new(settings.tz);
            if split {
                calendar = calendar.with_slots(settings.slot_size);
            }
            let result = calendar
                .free_busy(req.schedule, &req.hours, &req.appointments, &req.window)
                .context("Failed to compute schedule free/busy")?;
            info!(free = result.free.len(), busy = result.busy.len(), "schedule computed");
            write_json(output.as_deref(), &result)?;
        }
        Commands::NextSlot {
            input,
            output,
            after,
            slots,
        } => {
            let req: RosterRequest = parse(&read_input(input.as_deref())?, "roster")?;
            let slots = match (slots, &req.appointment_type) {
                (Some(slots), _) => slots,
                (None, Some(kind)) if kind.is_bookable() => kind.slots,
                (None, Some(kind)) => {
                    anyhow::bail!("Appointment type '{}' cannot be booked online", kind.name)
                }
                (None, None) => {
                    anyhow::bail!("No slot count: pass --slots or include an appointment_type")
                }
            };
            let free = roster_calendar(&settings, false)
                .free(&req.roster, &req.appointments, &req.window)
                .context("Failed to compute roster free time")?;
            let opening = first_available(&free, after, slots, settings.slot_size, settings.tz);
            info!(found = opening.is_some(), "next slot searched");
            write_json(output.as_deref(), &opening)?;
        }
        Commands::Check {
            input,
            output,
            schedule,
            start,
            end,
            now,
        } => {
            let req: RosterRequest = parse(&read_input(input.as_deref())?, "roster")?;
            let now = now.unwrap_or_else(Utc::now);
            let range = validate_booking(start, end, settings.slot_size, settings.tz, now)
                .context("Booking request rejected")?;
            let free = roster_calendar(&settings, false)
                .free(&req.roster, &req.appointments, &req.window)
                .context("Failed to compute roster free time")?;
            let available = is_available(&free, schedule, &range);
            info!(available, "booking checked");
            write_json(
                output.as_deref(),
                &json!({ "schedule": schedule, "available": available }),
            )?;
        }
        Commands::Grid {
            input,
            output,
            date,
            days,
            start_mins,
            end_mins,
            fit_events,
            from_mins,
            to_mins,
        } => {
            let req: GridRequest = parse(&read_input(input.as_deref())?, "grid")?;
            let mut spec =
                GridSpec::new(date, days, settings.slot_size).with_hours(start_mins, end_mins);
            if fit_events {
                spec = spec.fit_events();
            }
            let grid = DayGrid::new(spec, &req.events, settings.tz)
                .context("Failed to build slot grid")?;
            let text = match (from_mins, to_mins) {
                (Some(from), Some(to)) => render_grid(&grid.windowed(from, to), &grid),
                _ => render_grid(&grid, &grid),
            };
            info!(slots = grid.slots(), events = grid.events().len(), "grid rendered");
            write_output(output.as_deref(), &text)?;
        }
    }

    Ok(())
}

fn roster_calendar(settings: &Settings, split: bool) -> RosterCalendar {
    let calendar = RosterCalendar::new(settings.tz);
    if split {
        calendar.with_slots(settings.slot_size)
    } else {
        calendar
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut pretty = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    pretty.push('\n');
    write_output(path, &pretty)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
