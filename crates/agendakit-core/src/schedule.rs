//! Schedule derivation.
//!
//! The store keeps raw wall-clock items; everything user-facing consumes
//! the view built here. [`build_schedule`] anchors each item to the meeting
//! date, computes its end instant and sorts the result by start.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::item::AgendaItem;

/// An agenda item resolved to absolute start and end instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    /// Topic label.
    pub topic: String,
    /// Who runs the slot. May be empty.
    pub owner: String,
    /// Meeting date combined with the item's wall-clock time.
    pub start: NaiveDateTime,
    /// Start plus the item's duration.
    pub end: NaiveDateTime,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// Free-form notes. May be empty.
    pub notes: String,
}

impl ScheduledItem {
    /// Resolves one item against the given meeting date.
    pub fn from_item(item: &AgendaItem, date: NaiveDate) -> Self {
        let start = date.and_time(item.start_time);
        let end = start + Duration::minutes(i64::from(item.duration_minutes));
        Self {
            topic: item.topic.clone(),
            owner: item.owner.clone(),
            start,
            end,
            duration_minutes: item.duration_minutes,
            notes: item.notes.clone(),
        }
    }
}

/// Builds the time-sorted schedule view for one agenda.
///
/// Pure: the input slice is never modified and the same input always yields
/// the same output. The sort is stable, so items sharing a start instant
/// keep their insertion order. An empty input yields an empty schedule.
pub fn build_schedule(items: &[AgendaItem], date: NaiveDate) -> Vec<ScheduledItem> {
    let mut schedule: Vec<ScheduledItem> = items
        .iter()
        .map(|item| ScheduledItem::from_item(item, date))
        .collect();
    schedule.sort_by_key(|entry| entry.start);
    schedule
}
