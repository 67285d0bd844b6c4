//! Accept loop and per-connection framing for the daemon socket.
//!
//! Binding claims the socket path first: a live server answering on it is
//! an error, a leftover file from a crash is cleared when the config says
//! so. Accepted connections each carry a semaphore permit, which bounds
//! how many clients are served at once. The socket file is unlinked when
//! the server drops.

use std::sync::Arc;

use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use agendakit_protocol::{Envelope, FrameReader, FrameWriter, ProtocolError, Request, Response};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Refuses to bind over a live server; clears leftovers when configured.
async fn claim_socket_path(config: &ServerConfig) -> ServerResult<()> {
    let path = &config.socket_path;

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        return Err(ServerError::socket_path_invalid(parent));
    }

    if !path.exists() {
        return Ok(());
    }
    if !config.cleanup_stale_socket {
        return Err(ServerError::socket_in_use(path));
    }

    // A connect probe tells a live server from a leftover file
    if UnixStream::connect(path).await.is_ok() {
        return Err(ServerError::socket_in_use(path));
    }

    info!(path = %path.display(), "Removing stale socket");
    std::fs::remove_file(path)?;
    Ok(())
}

/// Listener bound to the daemon socket.
///
/// [`SocketServer::run`] turns it into an accept loop;
/// [`SocketServer::accept`] hands out one connection at a time for tests
/// and custom loops.
pub struct SocketServer {
    config: ServerConfig,
    listener: UnixListener,
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Binds a server to the configured socket path.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        claim_socket_path(&config).await?;

        let listener = UnixListener::bind(&config.socket_path)?;
        debug!(path = %config.socket_path.display(), "Socket bound");

        Ok(Self {
            connection_semaphore: Arc::new(Semaphore::new(config.max_connections)),
            config,
            listener,
        })
    }

    /// Waits for the next client.
    ///
    /// Blocks while all connection permits are taken. The returned
    /// [`Connection`] frees its permit on drop.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = Arc::clone(&self.connection_semaphore)
            .acquire_owned()
            .await
            .expect("semaphore closed");

        let (stream, _addr) = self.listener.accept().await?;
        debug!("Connection accepted");
        let (read_half, write_half) = stream.into_split();

        Ok(Connection {
            reader: FrameReader::new(read_half),
            writer: FrameWriter::new(write_half),
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Accept loop without an exit path.
    ///
    /// Each connection runs on its own task; accept errors are logged and
    /// the loop keeps going. [`Self::run_until_shutdown`] is the stoppable
    /// variant.
    pub async fn run<F, Fut>(&self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handler(connection));
                }
                Err(e) => error!(error = %e, "Accept failed"),
            }
        }
    }

    /// Accept loop that stops when `shutdown` resolves.
    pub async fn run_until_shutdown<F, Fut, S>(&self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
        S: std::future::Future<Output = ()> + Send,
    {
        tokio::select! {
            _ = shutdown => {
                info!("Leaving accept loop");
                Ok(())
            }
            result = self.run(handler) => result,
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.config.socket_path) {
            Ok(()) => debug!(
                path = %self.config.socket_path.display(),
                "Removed socket file"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.config.socket_path.display(),
                error = %e,
                "Failed to remove socket file"
            ),
        }
    }
}

/// One accepted client, framed for request/response exchange.
///
/// Holds its concurrency permit until dropped. Reads and writes are
/// capped by the configured connection timeout.
pub struct Connection {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    timeout: std::time::Duration,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

impl Connection {
    /// Next request from the client, or `None` on a clean hangup.
    pub async fn read_request(&mut self) -> ServerResult<Option<Envelope<Request>>> {
        match tokio::time::timeout(self.timeout, self.reader.read_message()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Protocol(ProtocolError::Timeout {
                operation: "reading a request".to_string(),
            })),
        }
    }

    /// Sends one response envelope.
    pub async fn write_response(&mut self, envelope: &Envelope<Response>) -> ServerResult<()> {
        match tokio::time::timeout(self.timeout, self.writer.write_message(envelope)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::Protocol(ProtocolError::Timeout {
                operation: "writing a response".to_string(),
            })),
        }
    }

    /// Sends a response for the given request, echoing its session.
    pub async fn respond(
        &mut self,
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        response: Response,
    ) -> ServerResult<()> {
        let envelope = Envelope::response(request_id, session_id, response);
        self.write_response(&envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use chrono::NaiveTime;
    use tempfile::{TempDir, tempdir};

    use crate::handler::{RequestHandler, new_shared_state};
    use agendakit_protocol::ErrorCode;

    fn scratch() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agendakit.sock");
        (dir, path)
    }

    async fn send_request(stream: &mut UnixStream, envelope: &Envelope<Request>) {
        FrameWriter::new(stream).write_message(envelope).await.unwrap();
    }

    async fn read_response(stream: &mut UnixStream) -> Envelope<Response> {
        FrameReader::new(stream)
            .read_message()
            .await
            .unwrap()
            .expect("server closed the stream without responding")
    }

    #[tokio::test]
    async fn bind_creates_and_drop_removes_the_socket_file() {
        let (_dir, socket_path) = scratch();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        assert!(socket_path.exists());

        drop(server);
        assert!(!socket_path.exists());
    }

    #[tokio::test]
    async fn live_socket_is_detected_by_the_probe() {
        let (_dir, socket_path) = scratch();

        // Cleanup enabled, but the probe finds the first server answering
        let config = ServerConfig::new(&socket_path).with_cleanup_stale_socket(true);
        let _server = SocketServer::new(config.clone()).await.unwrap();

        let result = SocketServer::new(config).await;
        assert!(matches!(result, Err(ServerError::SocketInUse { .. })));
    }

    #[tokio::test]
    async fn existing_socket_is_refused_when_cleanup_is_off() {
        let (_dir, socket_path) = scratch();

        let config = ServerConfig::new(&socket_path).with_cleanup_stale_socket(false);
        let _server = SocketServer::new(config.clone()).await.unwrap();

        let result = SocketServer::new(config).await;
        assert!(matches!(result, Err(ServerError::SocketInUse { .. })));
    }

    #[tokio::test]
    async fn leftover_file_is_cleared_when_nothing_answers() {
        let (_dir, socket_path) = scratch();

        // A leftover file nothing listens on
        std::fs::write(&socket_path, b"leftover").unwrap();

        let config = ServerConfig::new(&socket_path).with_cleanup_stale_socket(true);
        let server = SocketServer::new(config).await.unwrap();

        assert!(socket_path.exists());
        drop(server);
    }

    #[tokio::test]
    async fn ping_round_trips_through_a_connection() {
        let (_dir, socket_path) = scratch();

        let config =
            ServerConfig::new(&socket_path).with_connection_timeout(Duration::from_secs(5));
        let server = SocketServer::new(config).await.unwrap();

        let client_path = socket_path.clone();
        let client_task = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();

            let request = Envelope::request("ping-1", "standup", Request::Ping);
            send_request(&mut stream, &request).await;

            let response = read_response(&mut stream).await;
            assert_eq!(response.request_id, "ping-1");
            assert_eq!(response.session_id, "standup");
            assert_eq!(response.payload, Response::Pong);
        });

        let mut conn = server.accept().await.unwrap();
        let request = conn.read_request().await.unwrap().unwrap();
        assert_eq!(request.payload, Request::Ping);

        conn.respond(&request.request_id, &request.session_id, Response::Pong)
            .await
            .unwrap();

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn clean_hangup_reads_as_none() {
        let (_dir, socket_path) = scratch();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();

        let client_path = socket_path.clone();
        let handle = tokio::spawn(async move {
            // Connect and drop immediately so the server sees EOF
            let _stream: UnixStream = UnixStream::connect(&client_path).await.unwrap();
        });

        let mut conn = server.accept().await.unwrap();
        handle.await.unwrap();

        let result = conn.read_request().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn silent_client_times_out() {
        let (_dir, socket_path) = scratch();

        let config =
            ServerConfig::new(&socket_path).with_connection_timeout(Duration::from_millis(50));
        let server = SocketServer::new(config).await.unwrap();

        // Connect but never send a frame
        let _stream = UnixStream::connect(&socket_path).await.unwrap();
        let mut conn = server.accept().await.unwrap();

        let result = conn.read_request().await;
        assert!(matches!(
            result,
            Err(ServerError::Protocol(ProtocolError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn handler_loop_serves_a_session() {
        let (_dir, socket_path) = scratch();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        let handler = RequestHandler::new(new_shared_state());

        let client_path = socket_path.clone();
        let client_task = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();

            let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
            let add = Request::add_item("Kickoff", "Ana", start, 15, "");
            send_request(&mut stream, &Envelope::request("r1", "default", add)).await;
            assert_eq!(read_response(&mut stream).await.payload, Response::Ok);

            send_request(
                &mut stream,
                &Envelope::request("r2", "default", Request::GetAgenda),
            )
            .await;
            match read_response(&mut stream).await.payload {
                Response::Agenda { items, .. } => {
                    assert_eq!(items.len(), 1);
                    assert_eq!(items[0].topic, "Kickoff");
                }
                other => panic!("Expected Agenda response, got {:?}", other),
            }
        });

        let conn = server.accept().await.unwrap();
        handler.handle_connection(conn).await.unwrap();

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn handler_loop_rejects_unsupported_version() {
        let (_dir, socket_path) = scratch();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        let handler = RequestHandler::new(new_shared_state());

        let client_path = socket_path.clone();
        let client_task = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();

            let envelope = Envelope {
                protocol_version: "99".to_string(),
                request_id: "r1".to_string(),
                session_id: "default".to_string(),
                payload: Request::Ping,
            };
            send_request(&mut stream, &envelope).await;

            let response = read_response(&mut stream).await;
            match response.payload.as_error() {
                Some(error) => assert_eq!(error.code, ErrorCode::UnsupportedVersion),
                None => panic!("Expected Error response, got {:?}", response.payload),
            }
        });

        let conn = server.accept().await.unwrap();
        handler.handle_connection(conn).await.unwrap();

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_request_ends_connection_loop() {
        let (_dir, socket_path) = scratch();

        let server = SocketServer::new(ServerConfig::new(&socket_path)).await.unwrap();
        let handler = RequestHandler::new(new_shared_state());

        let client_path = socket_path.clone();
        let client_task = tokio::spawn(async move {
            let mut stream = UnixStream::connect(&client_path).await.unwrap();

            send_request(
                &mut stream,
                &Envelope::request("r1", "default", Request::Shutdown),
            )
            .await;
            assert_eq!(read_response(&mut stream).await.payload, Response::Ok);
        });

        let conn = server.accept().await.unwrap();
        let result = handler.handle_connection(conn).await;
        assert!(matches!(result, Err(ServerError::Shutdown)));

        client_task.await.unwrap();
    }
}
