//! Per-session agenda store.
//!
//! [`AgendaStore`] owns the item sequence for one session, in insertion
//! order. Items are appended one at a time; the only bulk operations are
//! [`AgendaStore::clear`] and [`AgendaStore::load_example`]. Display and
//! export order is always derived by sorting on the start instant, never
//! taken from insertion order.

use chrono::NaiveTime;
use thiserror::Error;

use crate::item::AgendaItem;

/// Non-fatal validation outcome of an add request.
///
/// A rejection leaves the store untouched and is meant to be surfaced as a
/// warning, not as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgendaWarning {
    /// The topic was empty after trimming surrounding whitespace.
    #[error("topic must not be empty")]
    EmptyTopic,
}

/// Insertion-ordered collection of agenda items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgendaStore {
    items: Vec<AgendaItem>,
}

impl AgendaStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends one item.
    ///
    /// Surrounding whitespace is trimmed from `topic`, `owner` and `notes`
    /// before storage. A topic that is empty after trimming is rejected
    /// with [`AgendaWarning::EmptyTopic`] and nothing is stored.
    pub fn add_item(
        &mut self,
        topic: &str,
        owner: &str,
        start_time: NaiveTime,
        duration_minutes: u32,
        notes: &str,
    ) -> Result<(), AgendaWarning> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AgendaWarning::EmptyTopic);
        }
        self.items.push(
            AgendaItem::new(topic, start_time, duration_minutes)
                .with_owner(owner.trim())
                .with_notes(notes.trim()),
        );
        Ok(())
    }

    /// Replaces the whole sequence with the scripted example agenda.
    pub fn load_example(&mut self) {
        self.items = example_items();
    }

    /// Drops every item. Meeting metadata is not stored here and survives.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The items in insertion order.
    pub fn items(&self) -> &[AgendaItem] {
        &self.items
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The fixed four-slot agenda behind the "load example" action.
fn example_items() -> Vec<AgendaItem> {
    vec![
        AgendaItem::new("Bienvenida", hm(9, 0), 10)
            .with_owner("Anfitrión")
            .with_notes("Introducción breve"),
        AgendaItem::new("Estado del proyecto", hm(9, 10), 25)
            .with_owner("PM")
            .with_notes("Riesgos y avances"),
        AgendaItem::new("Bloque técnico", hm(9, 35), 30)
            .with_owner("Dev Lead")
            .with_notes("Demostración"),
        AgendaItem::new("Q&A", hm(10, 5), 15)
            .with_owner("Todos")
            .with_notes("Preguntas"),
    ]
}

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).expect("valid time")
}
