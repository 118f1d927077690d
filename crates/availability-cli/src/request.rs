//! JSON request bodies read by the subcommands.

use anyhow::{Context, Result};
use availability_engine::{AppointmentType, Event, OpeningHours, ScheduleId, ScheduleRange, Window};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A rostered resource: its roster blocks (sorted by start) and the
/// appointments booked against it.
#[derive(Debug, Deserialize)]
pub struct RosterRequest {
    pub window: Window,
    #[serde(default)]
    pub roster: Vec<ScheduleRange>,
    #[serde(default)]
    pub appointments: Vec<Event>,
    /// Sizes a `next-slot` search when no slot count is given.
    #[serde(default)]
    pub appointment_type: Option<AppointmentType>,
}

/// A schedule with weekly opening hours.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub schedule: ScheduleId,
    pub window: Window,
    pub hours: OpeningHours,
    #[serde(default)]
    pub appointments: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct GridRequest {
    #[serde(default)]
    pub events: Vec<Event>,
}

pub fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Failed to parse {what} request"))
}
