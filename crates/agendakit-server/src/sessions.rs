//! Session registry with idle expiry.
//!
//! Each connecting client names a session; the registry creates it on first
//! use and drops it again once it has sat idle for the configured TTL.
//! Expired sessions are swept on access, so no background task is needed.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::Instant;
use tracing::{debug, trace};

use agendakit_core::{AgendaStore, MeetingDetails};

/// How long a session may sit idle before it is dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// One client workspace: an agenda plus the meeting details its exports use.
#[derive(Debug)]
pub struct Session {
    /// Agenda items collected so far.
    pub store: AgendaStore,
    /// Meeting metadata shared by all items.
    pub details: MeetingDetails,
    /// Last time a request touched this session (monotonic clock).
    last_access: Instant,
}

impl Session {
    fn new(date: NaiveDate) -> Self {
        Self {
            store: AgendaStore::new(),
            details: MeetingDetails::new(date),
            last_access: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        Instant::now().duration_since(self.last_access) >= ttl
    }
}

/// Session registry keyed by client-chosen session id.
#[derive(Debug)]
pub struct SessionMap {
    idle_ttl: Duration,
    sessions: HashMap<String, Session>,
}

impl Default for SessionMap {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionMap {
    /// Creates a registry whose sessions expire after `idle_ttl` without access.
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl,
            sessions: HashMap::new(),
        }
    }

    /// Returns the configured idle TTL.
    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Returns the session for `id`, creating it if missing or expired.
    ///
    /// A fresh session starts with an empty agenda and details anchored to
    /// `today`. The access counts as activity and also sweeps every other
    /// expired session.
    pub fn session(&mut self, id: &str, today: NaiveDate) -> &mut Session {
        self.sweep_expired();

        let session = self.sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = %id, "Created session");
            Session::new(today)
        });
        session.touch();
        session
    }

    /// Removes sessions idle for longer than the TTL. Returns how many were
    /// dropped.
    pub fn sweep_expired(&mut self) -> usize {
        let ttl = self.idle_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = !session.is_expired(ttl);
            if !keep {
                trace!(session_id = %id, "Dropping idle session");
            }
            keep
        });

        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!(dropped = dropped, "Swept idle sessions");
        }
        dropped
    }

    /// Number of sessions that have not expired yet.
    pub fn active_count(&self) -> usize {
        let ttl = self.idle_ttl;
        self.sessions
            .values()
            .filter(|session| !session.is_expired(ttl))
            .count()
    }

    /// Number of sessions still held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no sessions are held.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
