//! Server commands: serve, status, shutdown.
//!
//! `run` brings the daemon up in order: claim the PID file, install the
//! signal handler, build the shared session state, then hand the socket
//! listener its connection handler.

use tracing::info;

use agendakit_protocol::{Request, Response};
use agendakit_server::{
    PidFile, ServerConfig, SignalHandler, SocketServer, default_pid_path,
    make_connection_handler, new_shared_state_with_ttl,
};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::{resolve_socket_path, socket_client, unexpected};

/// Runs the daemon in the foreground.
///
/// Blocks until a shutdown signal (SIGTERM/SIGINT) or a shutdown request
/// arrives over the socket.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    // 1. PID file (prevents duplicate server instances)
    let pid_file = PidFile::create(default_pid_path())
        .map_err(|e| ClientError::Daemon(format!("failed to create PID file: {}", e)))?;

    // 2. Signal handler
    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    // 3. Shared state, wired so shutdown requests also stop the accept loop
    let socket_path = resolve_socket_path(cli, config);
    let server_config = ServerConfig::new(&socket_path);
    let state = new_shared_state_with_ttl(server_config.session_ttl);
    {
        let mut s = state.write().await;
        s.set_shutdown_handle(signal_handler.shutdown_handle());
    }

    // 4. Socket server
    let idle_ttl = server_config.session_ttl;
    let server = SocketServer::new(server_config)
        .await
        .map_err(|e| ClientError::Daemon(format!("failed to start socket server: {}", e)))?;

    info!(
        path = %socket_path.display(),
        pid_file = %pid_file.path().display(),
        idle_ttl_secs = idle_ttl.as_secs(),
        "Server listening"
    );

    let handler = make_connection_handler(state.clone());
    let shutdown = signal_handler.shutdown_handle();

    server
        .run_until_shutdown(handler, shutdown.wait())
        .await
        .map_err(|e| ClientError::Daemon(format!("server error: {}", e)))?;

    info!("Server shut down");
    Ok(())
}

/// Queries the running server and prints its status.
pub async fn status(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match socket_client(cli, config).send(Request::Status).await {
        Ok(Response::Status { info }) => {
            println!("server: running");
            println!("uptime: {}s", info.uptime_seconds);
            println!("active sessions: {}", info.active_sessions);
            Ok(())
        }
        Ok(Response::Error { error }) => Err(ClientError::Server(error.message)),
        Ok(other) => Err(unexpected(other)),
        Err(ClientError::Connection(_)) => {
            println!("server: not running (start it with `agendakit serve`)");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Asks the running server to stop.
pub async fn shutdown(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match socket_client(cli, config).send(Request::Shutdown).await {
        Ok(Response::Ok) => {
            println!("server stopping");
            Ok(())
        }
        Ok(Response::Error { error }) => Err(ClientError::Server(error.message)),
        Ok(other) => Err(unexpected(other)),
        Err(ClientError::Connection(_)) => {
            println!("server: not running");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
