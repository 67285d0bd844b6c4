//! The `agendakit` command-line tool.
//!
//! Parses the CLI, resolves settings from flags and the config file, and
//! talks to the daemon over its Unix socket. The `serve` command embeds the
//! server crate so one binary covers both roles.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod socket;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use socket::SocketClient;
