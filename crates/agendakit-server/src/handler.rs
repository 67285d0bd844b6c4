//! Dispatch of decoded requests against the session registry.
//!
//! Every request names a session; the handler looks it up (creating it on
//! first use) and produces the response the client renders.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use agendakit_core::{build_schedule, export_ics, export_json};
use agendakit_protocol::{ErrorCode, PROTOCOL_VERSION, Request, Response, StatusInfo};

use crate::error::{ServerError, ServerResult};
use crate::sessions::{Session, SessionMap};
use crate::signals::ShutdownHandle;
use crate::socket::Connection;

/// Mutable state every connection sees, behind one RwLock.
#[derive(Debug)]
pub struct ServerState {
    /// Anchor for uptime reporting.
    start_time: DateTime<Utc>,
    /// Session registry.
    sessions: SessionMap,
    /// Set once a client asked the server to stop.
    shutdown_requested: bool,
    /// Handle for stopping the accept loop, if one is wired up.
    shutdown_handle: Option<ShutdownHandle>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates a new server state with the default session TTL.
    pub fn new() -> Self {
        Self::with_session_ttl(crate::sessions::DEFAULT_IDLE_TTL)
    }

    /// Creates a new server state whose sessions expire after `idle_ttl`.
    pub fn with_session_ttl(idle_ttl: std::time::Duration) -> Self {
        Self {
            start_time: Utc::now(),
            sessions: SessionMap::new(idle_ttl),
            shutdown_requested: false,
            shutdown_handle: None,
        }
    }

    /// Whole seconds since the server came up, clamped at zero.
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }

    /// Builds the status snapshot, sweeping idle sessions first.
    pub fn status_info(&mut self) -> StatusInfo {
        self.sessions.sweep_expired();
        StatusInfo::new(self.uptime_seconds(), self.sessions.active_count())
    }

    /// Returns the session for `id`, creating it anchored to today if needed.
    pub fn session(&mut self, id: &str) -> &mut Session {
        self.sessions.session(id, Local::now().date_naive())
    }

    /// Requests a shutdown and trips the accept loop if a handle is wired up.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
        if let Some(ref handle) = self.shutdown_handle {
            handle.trigger();
        }
    }

    /// True once a Shutdown request has been accepted.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Wires up the handle the accept loop waits on.
    pub fn set_shutdown_handle(&mut self, handle: ShutdownHandle) {
        self.shutdown_handle = Some(handle);
    }
}

/// [`ServerState`] as every connection holds it.
pub type SharedState = Arc<RwLock<ServerState>>;

/// Fresh state with default knobs, ready to share.
pub fn new_shared_state() -> SharedState {
    Arc::new(RwLock::new(ServerState::new()))
}

/// Fresh state whose sessions expire after `idle_ttl`.
pub fn new_shared_state_with_ttl(idle_ttl: std::time::Duration) -> SharedState {
    Arc::new(RwLock::new(ServerState::with_session_ttl(idle_ttl)))
}

/// Turns decoded requests into responses against the shared state.
pub struct RequestHandler {
    state: SharedState,
}

impl RequestHandler {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Handles a single request against the named session.
    #[tracing::instrument(skip(self, request), fields(kind = request_kind(request), elapsed_ms))]
    pub async fn handle(&self, session_id: &str, request: &Request) -> Response {
        let start = std::time::Instant::now();

        let response = match request {
            Request::Ping => Response::Pong,
            Request::Status => {
                let mut state = self.state.write().await;
                Response::status(state.status_info())
            }
            Request::AddItem {
                topic,
                owner,
                start_time,
                duration_minutes,
                notes,
            } => {
                debug!(topic = %topic, "Adding agenda item");
                let mut state = self.state.write().await;
                let session = state.session(session_id);
                match session
                    .store
                    .add_item(topic, owner, *start_time, *duration_minutes, notes)
                {
                    Ok(()) => Response::Ok,
                    Err(warning) => {
                        debug!(reason = %warning, "Rejected agenda item");
                        Response::warning(warning.to_string())
                    }
                }
            }
            Request::Clear => {
                let mut state = self.state.write().await;
                let session = state.session(session_id);
                let removed = session.store.len();
                session.store.clear();
                debug!(removed = removed, "Cleared agenda");
                Response::Ok
            }
            Request::LoadExample => {
                let mut state = self.state.write().await;
                state.session(session_id).store.load_example();
                Response::Ok
            }
            Request::SetDetails { patch } => {
                debug!(?patch, "Updating meeting details");
                let mut state = self.state.write().await;
                patch.apply_to(&mut state.session(session_id).details);
                Response::Ok
            }
            Request::GetAgenda => {
                let mut state = self.state.write().await;
                let session = state.session(session_id);
                let schedule = build_schedule(session.store.items(), session.details.date);
                debug!(item_count = schedule.len(), "Built agenda");
                Response::agenda(session.details.clone(), schedule)
            }
            Request::ExportIcs => {
                let mut state = self.state.write().await;
                let session = state.session(session_id);
                let schedule = build_schedule(session.store.items(), session.details.date);
                let document = export_ics(&schedule, &session.details);
                Response::document("agenda.ics", "text/calendar", document)
            }
            Request::ExportJson => {
                let mut state = self.state.write().await;
                let session = state.session(session_id);
                let schedule = build_schedule(session.store.items(), session.details.date);
                match export_json(&schedule) {
                    Ok(document) => {
                        Response::document("agenda.json", "application/json", document)
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize agenda");
                        Response::error(
                            ErrorCode::InternalError,
                            format!("failed to serialize agenda: {}", e),
                        )
                    }
                }
            }
            Request::Shutdown => {
                info!("Shutdown requested by client");
                let mut state = self.state.write().await;
                state.request_shutdown();
                Response::Ok
            }
        };

        tracing::Span::current().record("elapsed_ms", start.elapsed().as_millis());
        debug!("Request handled");

        response
    }

    /// Handles a connection, processing all requests until the client hangs up.
    ///
    /// Requests carrying an unknown protocol version are answered with an
    /// error instead of being dispatched.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        loop {
            match conn.read_request().await {
                Ok(Some(envelope)) => {
                    let response = if envelope.is_compatible() {
                        self.handle(&envelope.session_id, &envelope.payload).await
                    } else {
                        warn!(
                            version = %envelope.protocol_version,
                            expected = %PROTOCOL_VERSION,
                            "Rejecting request with unsupported protocol version"
                        );
                        Response::error(
                            ErrorCode::UnsupportedVersion,
                            format!(
                                "server speaks protocol version {}, got {}",
                                PROTOCOL_VERSION, envelope.protocol_version
                            ),
                        )
                    };
                    conn.respond(&envelope.request_id, &envelope.session_id, response)
                        .await?;

                    if self.state.read().await.shutdown_requested() {
                        return Err(ServerError::Shutdown);
                    }
                }
                Ok(None) => {
                    debug!("Client hung up");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read request");
                    return Err(e);
                }
            }
        }
    }
}

/// Payload-free request name for log fields.
fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::AddItem { .. } => "add_item",
        Request::Clear => "clear",
        Request::LoadExample => "load_example",
        Request::SetDetails { .. } => "set_details",
        Request::GetAgenda => "get_agenda",
        Request::ExportIcs => "export_ics",
        Request::ExportJson => "export_json",
        Request::Status => "status",
        Request::Shutdown => "shutdown",
        Request::Ping => "ping",
    }
}

/// Adapts shared state to the closure [`crate::SocketServer::run`] expects.
/// Each accepted connection gets its own handler over the same state.
pub fn make_connection_handler(
    state: SharedState,
) -> impl Fn(Connection) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
+ Send
+ Sync
+ 'static {
    move |conn| {
        let handler = RequestHandler::new(state.clone());
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await
                && !matches!(e, ServerError::Shutdown)
            {
                warn!(error = %e, "Connection ended with error");
            }
        })
    }
}
