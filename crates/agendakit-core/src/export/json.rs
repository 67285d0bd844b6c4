//! JSON agenda serialization.
//!
//! The array layout (field names, ISO instants without offset, two-space
//! indentation) is the long-standing shape of the downloadable artifact,
//! so it is pinned here instead of being derived from the in-memory types.

use serde::{Deserialize, Serialize};

use crate::schedule::ScheduledItem;

/// Instant layout inside the artifact: ISO 8601 to the second, no offset.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One agenda row as it appears in the exported JSON array.
///
/// Field names are the artifact's contract and stay as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonAgendaItem {
    pub tema: String,
    pub responsable: String,
    pub inicio: String,
    pub fin: String,
    pub duracion_min: u32,
    pub notas: String,
}

impl JsonAgendaItem {
    /// Renders one scheduled slot into its artifact row.
    pub fn from_scheduled(item: &ScheduledItem) -> Self {
        Self {
            tema: item.topic.clone(),
            responsable: item.owner.clone(),
            inicio: item.start.format(INSTANT_FORMAT).to_string(),
            fin: item.end.format(INSTANT_FORMAT).to_string(),
            duracion_min: item.duration_minutes,
            notas: item.notes.clone(),
        }
    }
}

/// Serializes the schedule as the downloadable JSON document.
///
/// Row order follows the input. An empty schedule serializes to `[]`.
/// Non-ASCII text is written literally, not as `\u` escapes.
pub fn export_json(schedule: &[ScheduledItem]) -> serde_json::Result<String> {
    let rows: Vec<JsonAgendaItem> = schedule.iter().map(JsonAgendaItem::from_scheduled).collect();
    serde_json::to_string_pretty(&rows)
}
