//! Agenda data model.
//!
//! This module provides the types one meeting agenda is made of:
//! - [`AgendaItem`]: a single slot, a wall-clock start time plus a duration
//! - [`MeetingDetails`]: the metadata every slot of the agenda shares

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single agenda slot.
///
/// Items carry a time of day without a date; absolute instants are derived
/// against [`MeetingDetails::date`] when the schedule view is built. Two
/// items with identical fields are both kept and both exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    /// Topic label. Non-empty by construction, see
    /// [`AgendaStore::add_item`](crate::store::AgendaStore::add_item).
    pub topic: String,
    /// Who runs the slot. May be empty.
    pub owner: String,
    /// Wall-clock start, no date attached.
    pub start_time: NaiveTime,
    /// Slot length in minutes, at least 1.
    pub duration_minutes: u32,
    /// Free-form notes. May be empty.
    pub notes: String,
}

impl AgendaItem {
    /// Creates an item with empty owner and notes.
    pub fn new(topic: impl Into<String>, start_time: NaiveTime, duration_minutes: u32) -> Self {
        Self {
            topic: topic.into(),
            owner: String::new(),
            start_time,
            duration_minutes,
            notes: String::new(),
        }
    }

    /// Builder method to set the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Builder method to set the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Metadata shared by every slot of one agenda.
///
/// `date` anchors the wall-clock item times when the schedule view is built.
/// Changing it later never rewrites stored items; views are recomputed from
/// the current value each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDetails {
    /// Meeting title, also the exported calendar's display name.
    pub title: String,
    /// Day the agenda is anchored to.
    pub date: NaiveDate,
    /// Where the meeting happens. Free text.
    pub location: String,
    /// Who convenes the meeting. Free text.
    pub host: String,
}

impl MeetingDetails {
    /// Creates details for the given date with the stock defaults a fresh
    /// session starts from.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: "Reunión de seguimiento".to_string(),
            date,
            location: "Remoto".to_string(),
            host: "Equipo".to_string(),
        }
    }

    /// Builder method to set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder method to set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}
