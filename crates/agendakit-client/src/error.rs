//! Error type the CLI surfaces to the user.

use std::fmt;

use agendakit_protocol::ProtocolError;

/// Shorthand for fallible CLI operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the CLI.
///
/// Every variant carries a message ready for `error: {}` output on stderr.
/// `Io` keeps the source error so callers can still inspect the kind.
#[derive(Debug)]
pub enum ClientError {
    /// Bad or unreadable configuration.
    Config(String),
    /// Could not reach the server socket.
    Connection(String),
    /// Running in serve mode failed.
    Daemon(String),
    /// IO failure on the socket or the filesystem.
    Io(std::io::Error),
    /// Malformed frame or a payload the command did not expect.
    Protocol(String),
    /// The server answered with an error response.
    Server(String),
    /// The server did not answer in time.
    Timeout(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {}", msg),
            Self::Connection(msg) => f.write_str(msg),
            Self::Daemon(msg) => write!(f, "daemon: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Protocol(msg) => write!(f, "protocol: {}", msg),
            Self::Server(msg) => write!(f, "server: {}", msg),
            Self::Timeout(msg) => write!(f, "timed out {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

// Framing errors keep their io cause; everything else degrades to text.
impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(io) => Self::Io(io),
            other => Self::Protocol(other.to_string()),
        }
    }
}
