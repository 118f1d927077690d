//! Settings shared by every subcommand, resolved from flags with environment
//! fallbacks.

use availability_engine::day::parse_timezone;
use availability_engine::SlotSize;
use chrono_tz::Tz;
use clap::Args;
use std::io::IsTerminal;
use tracing::Level;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// IANA time zone that local days and slot boundaries are measured in
    #[arg(long, global = true, env = "AVAILABILITY_TZ", default_value = "UTC", value_parser = parse_tz)]
    pub tz: Tz,

    /// Slot length in minutes
    #[arg(long, global = true, env = "AVAILABILITY_SLOT_SIZE", default_value = "15", value_parser = parse_slot_size)]
    pub slot_size: SlotSize,

    /// Log level for diagnostics written to stderr
    #[arg(long, global = true, env = "AVAILABILITY_LOG", default_value = "warn")]
    pub log_level: Level,
}

impl Settings {
    /// Install the stderr log subscriber. Stdout carries only results.
    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(self.log_level)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .init();
    }
}

fn parse_tz(name: &str) -> Result<Tz, String> {
    parse_timezone(name).map_err(|e| e.to_string())
}

fn parse_slot_size(raw: &str) -> Result<SlotSize, String> {
    let minutes: u32 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a whole number of minutes"))?;
    SlotSize::new(minutes).map_err(|e| e.to_string())
}
