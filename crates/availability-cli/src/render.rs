//! Plain-text rendering of a slot grid.
//!
//! One column per day and one row per slot. An event's first cell shows its
//! id and the number of slots it spans, `#7 (3)`, and the cells it continues
//! into show `|`. Calendar blocks are bracketed, `[7] (3)`. Empty cells show
//! `.`.

use availability_engine::{DayGrid, Event, SlotGrid};

const COLUMN: usize = 12;

pub fn render_grid<G: SlotGrid>(view: &G, base: &DayGrid) -> String {
    let mut out = String::new();

    let mut header = format!("{:<6}", "time");
    for day in 0..view.days() {
        let date = base.date(day).map(|d| d.to_string()).unwrap_or_default();
        header.push_str(&format!(" {date:<COLUMN$}"));
    }
    push_line(&mut out, &header);

    for slot in 0..view.slots() {
        let minutes = view.slot_start_mins(slot).unwrap_or_default();
        let mut line = format!("{:02}:{:02} ", minutes / 60, minutes % 60);
        for day in 0..view.days() {
            let cell = cell(view, day, slot);
            line.push_str(&format!(" {cell:<COLUMN$}"));
        }
        push_line(&mut out, &line);
    }

    let footer = match view.first_free_slot(0, 0) {
        Some((day, slot)) => {
            let date = base.date(day).map(|d| d.to_string()).unwrap_or_default();
            let minutes = view.slot_start_mins(slot).unwrap_or_default();
            format!("first free: {date} {:02}:{:02}", minutes / 60, minutes % 60)
        }
        None => "first free: none".to_string(),
    };
    push_line(&mut out, &footer);
    out
}

fn cell<G: SlotGrid>(view: &G, day: u32, slot: usize) -> String {
    let Some(event) = view.event_at(day, slot) else {
        return ".".to_string();
    };
    let continues = slot > 0 && view.event_at(day, slot - 1).is_some_and(|prev| prev.id == event.id);
    if continues {
        return "|".to_string();
    }
    format!("{} ({})", label(event), view.slots_spanned(day, slot))
}

fn label(event: &Event) -> String {
    if event.is_blocking() {
        format!("[{}]", event.id)
    } else {
        format!("#{}", event.id)
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}
