//! Command implementations.
//!
//! Each submodule holds the commands for one area: `agenda` for item and
//! detail edits, `server` for daemon lifecycle, `config` for the config file.

pub mod agenda;
pub mod config;
pub mod server;

use std::path::PathBuf;
use std::time::Duration;

use agendakit_protocol::Response;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::socket::SocketClient;

/// Item duration in minutes when neither the flag nor the config file
/// names one.
pub const DEFAULT_DURATION_MINUTES: u32 = 15;

/// Resolves the socket path: `--socket` flag, then config file, then the
/// platform default.
pub fn resolve_socket_path(cli: &Cli, config: &ClientConfig) -> PathBuf {
    cli.socket_path
        .clone()
        .or_else(|| config.server.socket_path.clone())
        .unwrap_or_else(agendakit_server::default_socket_path)
}

/// Resolves the session name: `--session` flag, then config file, then
/// the built-in `default` session.
pub fn resolve_session(cli: &Cli, config: &ClientConfig) -> String {
    cli.session
        .clone()
        .or_else(|| config.session.clone())
        .unwrap_or_else(|| "default".to_string())
}

/// Resolves the item duration: `--duration` flag, then config file, then
/// [`DEFAULT_DURATION_MINUTES`].
pub fn resolve_duration(flag: Option<u32>, config: &ClientConfig) -> u32 {
    flag.or(config.duration).unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Builds a socket client from the resolved settings.
pub fn socket_client(cli: &Cli, config: &ClientConfig) -> SocketClient {
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.server.timeout));
    SocketClient::new(resolve_socket_path(cli, config), timeout)
        .with_session(resolve_session(cli, config))
}

pub(crate) fn unexpected(response: Response) -> ClientError {
    ClientError::Protocol(format!("unexpected response: {:?}", response))
}
