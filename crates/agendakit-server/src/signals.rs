//! Shutdown signaling.
//!
//! SIGTERM and SIGINT both stop the server. Shutdown can also be triggered
//! programmatically, which is how the protocol-level shutdown request stops
//! the accept loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Shared shutdown flag.
///
/// Clones are cheap and all observe the same flag; any clone can trigger it.
/// Triggering more than once is harmless.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    /// Creates a handle with the flag unset.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Sets the flag and wakes every waiter.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Returns true once shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes when shutdown is triggered.
    ///
    /// Resolves immediately if the flag is already set.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // Cannot fail: self keeps the sender alive for the whole wait
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// Hooks process signals up to a [`ShutdownHandle`].
pub struct SignalHandler {
    handle: ShutdownHandle,
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHandler {
    /// Creates a signal handler with a fresh shutdown flag.
    pub fn new() -> Self {
        Self {
            handle: ShutdownHandle::new(),
        }
    }

    /// Returns a handle observing the same flag as the listener task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Starts the background task watching for process signals.
    ///
    /// Call once at server startup. SIGTERM and SIGINT both trip the
    /// shutdown flag.
    #[cfg(unix)]
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();

        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");

            let received = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };

            info!(signal = received, "Received shutdown signal");
            handle.trigger();
        });
    }

    /// Non-Unix fallback, Ctrl+C only.
    #[cfg(not(unix))]
    pub fn spawn_listener(&self) {
        let handle = self.handle.clone();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received");
                handle.trigger();
            }
        });
    }
}
