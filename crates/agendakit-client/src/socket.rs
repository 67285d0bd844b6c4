//! Unix socket client for talking to the agendakit daemon.

use std::path::PathBuf;
use std::time::Duration;

use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use agendakit_protocol::{Envelope, FrameReader, FrameWriter, Request, Response};

use crate::error::{ClientError, ClientResult};

/// Client for one request/response exchange with the agendakit server.
///
/// Every call to [`send`](Self::send) opens a fresh connection; the session
/// id carried in the envelope is what ties consecutive commands together.
pub struct SocketClient {
    socket_path: PathBuf,
    session_id: String,
    timeout: Duration,
}

impl SocketClient {
    /// Creates a new socket client bound to the `default` session.
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            session_id: "default".to_string(),
            timeout,
        }
    }

    /// Addresses a different session on the server.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session_id = session.into();
        self
    }

    /// Session id sent with every request.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connects, sends one request, and waits for its response.
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(&request_id, &self.session_id, request);

        debug!(
            path = %self.socket_path.display(),
            session = %self.session_id,
            request_id = %request_id,
            "Connecting"
        );

        let stream = self.connect().await?;
        let reply = self.exchange(stream, &envelope).await?;

        if reply.request_id != request_id {
            warn!(
                sent = %request_id,
                received = %reply.request_id,
                "Reply correlates to a different request"
            );
        }

        Ok(reply.payload)
    }

    /// Opens the stream, turning timeouts and refusals into client errors.
    async fn connect(&self) -> ClientResult<UnixStream> {
        tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| {
                ClientError::Timeout(format!(
                    "connecting to {} after {}s",
                    self.socket_path.display(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ClientError::Connection(format!(
                    "failed to connect to {}: {} (is the server running? start it with `agendakit serve`)",
                    self.socket_path.display(),
                    e
                ))
            })
    }

    /// One write and one read on a fresh stream, each under the timeout.
    async fn exchange(
        &self,
        stream: UnixStream,
        envelope: &Envelope<Request>,
    ) -> ClientResult<Envelope<Response>> {
        let (read_half, write_half) = stream.into_split();
        let mut writer = FrameWriter::new(write_half);
        let mut reader = FrameReader::new(read_half);

        tokio::time::timeout(self.timeout, writer.write_message(envelope))
            .await
            .map_err(|_| ClientError::Timeout("sending request".into()))??;

        debug!("Request sent, awaiting reply");

        let reply = tokio::time::timeout(self.timeout, reader.read_message())
            .await
            .map_err(|_| ClientError::Timeout("reading response".into()))??;

        let reply: Envelope<Response> = reply.ok_or_else(|| {
            ClientError::Connection("server closed the connection before responding".into())
        })?;

        debug!(request_id = %reply.request_id, "Reply received");

        Ok(reply)
    }
}
