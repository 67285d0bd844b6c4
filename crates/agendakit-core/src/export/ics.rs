//! iCalendar document generation.
//!
//! Produces the interchange text consumed by calendar applications: one
//! VCALENDAR wrapping one VEVENT per agenda slot. Start and end times are
//! written as floating local times without an offset, and the document
//! declares a UTC display timezone, matching how the exported file has
//! always looked.

use chrono::{DateTime, Utc};

use crate::item::MeetingDetails;
use crate::schedule::ScheduledItem;

/// Product identifier written into every exported calendar.
const PRODID: &str = "-//AgendaKit//ES";

/// Floating local layout for DTSTART and DTEND.
const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";

/// UTC stamp layout for DTSTAMP.
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Serializes the schedule as a calendar document stamped with the current
/// time.
pub fn export_ics(schedule: &[ScheduledItem], details: &MeetingDetails) -> String {
    export_ics_at(schedule, details, Utc::now())
}

/// Serializes the schedule as a calendar document with an explicit
/// generation instant.
///
/// Every event in one export shares the same DTSTAMP. An empty schedule
/// still produces a valid document: the calendar wrapper with no events.
pub fn export_ics_at(
    schedule: &[ScheduledItem],
    details: &MeetingDetails,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        format!("X-WR-CALNAME:{}", escape_text(&details.title)),
        "X-WR-TIMEZONE:UTC".to_string(),
    ];

    let stamp = generated_at.format(STAMP_FORMAT).to_string();
    for (position, item) in schedule.iter().enumerate() {
        let start = item.start.format(FLOATING_FORMAT).to_string();
        lines.push("BEGIN:VEVENT".to_string());
        // The position suffix keeps UIDs distinct even for duplicate slots.
        lines.push(format!("UID:{}-{}@agendakit", start, position + 1));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("DTSTART:{start}"));
        lines.push(format!("DTEND:{}", item.end.format(FLOATING_FORMAT)));
        lines.push(format!("SUMMARY:{}", escape_text(&item.topic)));
        lines.push(format!("LOCATION:{}", escape_text(&details.location)));
        lines.push(format!("DESCRIPTION:{}", description_for(item)));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    lines.join("\n")
}

/// Builds the DESCRIPTION value: the owner line and the notes, each only
/// when non-empty, joined with the format's `\n` escape.
fn description_for(item: &ScheduledItem) -> String {
    let mut parts = Vec::new();
    if !item.owner.is_empty() {
        parts.push(format!("Responsable: {}", escape_text(&item.owner)));
    }
    if !item.notes.is_empty() {
        parts.push(escape_text(&item.notes));
    }
    parts.join("\\n")
}

/// Escapes a text value for embedding in a content line.
///
/// Backslash, semicolon and comma are reserved by RFC 5545; raw line breaks
/// become the `\n` escape and carriage returns are dropped.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
