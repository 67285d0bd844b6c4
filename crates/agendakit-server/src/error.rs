//! Error type shared by the socket listener and connection handlers.

use std::io;
use std::path::Path;

use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or file IO failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Framing or encoding failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] agendakit_protocol::ProtocolError),

    /// Another server owns the socket path.
    #[error("socket already in use: {path}")]
    SocketInUse { path: String },

    /// The socket path points into a directory that does not exist.
    #[error("socket parent directory does not exist: {path}")]
    SocketPathInvalid { path: String },

    /// Another server instance holds the PID file.
    #[error("server already running (PID file exists: {path})")]
    AlreadyRunning { path: String },

    /// A shutdown was requested and the connection loop should stop.
    #[error("server shutdown requested")]
    Shutdown,
}

impl ServerError {
    pub fn socket_in_use(path: &Path) -> Self {
        Self::SocketInUse {
            path: path.display().to_string(),
        }
    }

    pub fn socket_path_invalid(path: &Path) -> Self {
        Self::SocketPathInvalid {
            path: path.display().to_string(),
        }
    }

    pub fn already_running(path: &Path) -> Self {
        Self::AlreadyRunning {
            path: path.display().to_string(),
        }
    }
}
