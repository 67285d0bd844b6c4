//! Knobs for the socket server, all with working defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::sessions::DEFAULT_IDLE_TTL;

/// Runtime knobs for the socket server.
///
/// `new` pins the socket path and leaves the rest at defaults; the `with_`
/// methods override individual knobs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where to bind the Unix socket.
    pub socket_path: PathBuf,

    /// Per-read and per-write timeout on client connections.
    pub connection_timeout: Duration,

    /// Concurrent connection cap, enforced by the accept loop.
    pub max_connections: usize,

    /// How long a session may sit idle before it is dropped.
    pub session_ttl: Duration,

    /// Whether a dead leftover socket file may be removed at startup.
    pub cleanup_stale_socket: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            connection_timeout: Duration::from_secs(30),
            max_connections: 32,
            session_ttl: DEFAULT_IDLE_TTL,
            cleanup_stale_socket: true,
        }
    }
}

impl ServerConfig {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_cleanup_stale_socket(mut self, cleanup: bool) -> Self {
        self.cleanup_stale_socket = cleanup;
        self
    }
}

/// Per-user socket location: `$XDG_RUNTIME_DIR/agendakit.sock` when the
/// session manager provides a runtime dir, `/tmp/agendakit-$UID.sock`
/// otherwise.
pub fn default_socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(|dir| PathBuf::from(dir).join("agendakit.sock"))
        .unwrap_or_else(|| PathBuf::from(format!("/tmp/agendakit-{}.sock", current_uid())))
}

#[cfg(unix)]
pub(crate) fn current_uid() -> u32 {
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
pub(crate) fn current_uid() -> u32 {
    0
}
