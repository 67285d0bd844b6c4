//! Core types for building and exporting meeting agendas

pub mod display;
pub mod export;
pub mod item;
pub mod schedule;
pub mod store;
pub mod tracing;

pub use display::{ellipsis, format_agenda};
pub use export::{JsonAgendaItem, export_ics, export_ics_at, export_json};
pub use item::{AgendaItem, MeetingDetails};
pub use schedule::{ScheduledItem, build_schedule};
pub use store::{AgendaStore, AgendaWarning};
pub use tracing::{init_tracing, LogProfile, TracingConfig, TracingError};
