//! Flags and subcommands, parsed with clap's derive.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};

/// agendakit - Build and export a meeting agenda
#[derive(Debug, Parser)]
#[command(name = "agendakit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load instead of the default
    #[arg(long, short, env = "AGENDAKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Session to operate on
    #[arg(long, short, env = "AGENDAKIT_SESSION")]
    pub session: Option<String>,

    /// Socket the server listens on
    #[arg(long = "socket", env = "AGENDAKIT_SOCKET")]
    pub socket_path: Option<PathBuf>,

    /// Give up on the server after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Everything the binary can do.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an agenda item
    Add {
        /// Topic of the slot
        topic: String,

        /// Who runs the slot
        #[arg(long, default_value = "")]
        owner: String,

        /// Start time of the slot (HH:MM)
        #[arg(long, value_parser = parse_start_time)]
        start: NaiveTime,

        /// Length of the slot in minutes (default 15, or `duration` from
        /// the config file)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=480))]
        duration: Option<u32>,

        /// Free-form notes shown with the slot
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show the agenda sorted by start time
    Show,

    /// Replace the agenda with the built-in example
    Example,

    /// Remove every item from the agenda
    Clear,

    /// Update meeting details
    Meta {
        /// Meeting title
        #[arg(long)]
        title: Option<String>,

        /// Meeting date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Where the meeting happens
        #[arg(long)]
        location: Option<String>,

        /// Who convenes the meeting
        #[arg(long)]
        host: Option<String>,
    },

    /// Export the agenda as a document
    Export {
        /// Output format
        #[arg(value_enum)]
        format: ExportFormat,

        /// Write to this file (or into this directory) instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Report whether the server is up
    Status,

    /// Run the server in the foreground
    Serve,

    /// Stop the running server
    Shutdown,

    /// Inspect the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Export document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// iCalendar document
    Ics,
    /// JSON document
    Json,
}

/// What `agendakit config` can do.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the merged configuration as TOML
    Dump,

    /// Check the configuration for mistakes
    Validate,

    /// Print where the config file is looked up
    Path,
}

/// Parses a wall-clock time; seconds are optional.
fn parse_start_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}', expected HH:MM", s))
}

/// Parses an ISO calendar date.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))
}
