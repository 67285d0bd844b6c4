//! The agendakit daemon: a Unix socket listener dispatching requests
//! against an in-memory session registry.
//!
//! Sessions expire after an idle TTL, the accept loop stops on SIGTERM,
//! SIGINT, or a Shutdown request, and a PID file guards against double
//! starts. Bring one up with:
//!
//! ```rust,no_run
//! use agendakit_server::{ServerConfig, SocketServer, make_connection_handler, new_shared_state};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = SocketServer::new(ServerConfig::default()).await?;
//!     let state = new_shared_state();
//!     server.run(make_connection_handler(state)).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod pidfile;
mod sessions;
mod signals;
mod socket;

pub use config::{ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::{
    RequestHandler, ServerState, SharedState, make_connection_handler, new_shared_state,
    new_shared_state_with_ttl,
};
pub use pidfile::{PidFile, default_pid_path};
pub use sessions::{DEFAULT_IDLE_TTL, Session, SessionMap};
pub use signals::{ShutdownHandle, SignalHandler};
pub use socket::{Connection, SocketServer};
