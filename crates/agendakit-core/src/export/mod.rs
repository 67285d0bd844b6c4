//! Export serializers for the sorted agenda view.
//!
//! Two independent output formats consume the schedule:
//! - [`ics`]: an iCalendar document, one VEVENT per slot
//! - [`json`]: a JSON array using the artifact's historical field names
//!
//! Both take the already-sorted view from
//! [`build_schedule`](crate::schedule::build_schedule) and preserve its
//! order. Neither touches the store.

pub mod ics;
pub mod json;

pub use ics::{export_ics, export_ics_at};
pub use json::{JsonAgendaItem, export_json};
