//! Single-instance guard backed by a PID file.
//!
//! The file is written on startup and removed on drop. Files left behind
//! by a crashed instance hold a dead PID and are replaced rather than
//! treated as a running server.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, info, warn};

use crate::config::current_uid;
use crate::error::{ServerError, ServerResult};

/// What an existing PID file turned out to hold.
enum Claim {
    /// A process with this PID is alive.
    Live,
    /// The owning process is gone.
    Stale(u32),
    /// Unreadable or non-numeric content.
    Garbage,
}

fn inspect(path: &Path) -> Claim {
    let pid = fs::read_to_string(path)
        .ok()
        .and_then(|contents| contents.trim().parse::<u32>().ok());
    match pid {
        Some(pid) if process_alive(pid) => Claim::Live,
        Some(pid) => Claim::Stale(pid),
        None => Claim::Garbage,
    }
}

/// Probes for process existence without delivering a signal.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// Non-Unix: no reliable probe, so assume it is running.
#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Guard held for the lifetime of the server process.
///
/// Dropping it deletes the file.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Claims the PID file at `path` for this process.
    ///
    /// Fails if a live instance already holds it. Stale and unreadable
    /// files are replaced.
    pub fn create(path: impl Into<PathBuf>) -> ServerResult<Self> {
        let path = path.into();

        if path.exists() {
            match inspect(&path) {
                Claim::Live => return Err(ServerError::already_running(&path)),
                Claim::Stale(pid) => {
                    warn!(path = %path.display(), pid = pid, "Replacing stale PID file");
                }
                Claim::Garbage => {
                    warn!(path = %path.display(), "Replacing unreadable PID file");
                }
            }
            fs::remove_file(&path)?;
        }

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let pid = process::id();
        fs::write(&path, format!("{}\n", pid))?;

        info!(path = %path.display(), pid = pid, "Claimed PID file");

        Ok(Self { path })
    }

    /// Location of the file this guard holds.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed PID file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove PID file"
            ),
        }
    }
}

/// Default location for the PID file.
///
/// Prefers `$XDG_RUNTIME_DIR/agendakit.pid`, with a per-user `/tmp`
/// fallback.
pub fn default_pid_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(|dir| PathBuf::from(dir).join("agendakit.pid"))
        .unwrap_or_else(|| PathBuf::from(format!("/tmp/agendakit-{}.pid", current_uid())))
}
