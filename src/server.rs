//! HTTP server lifecycle: bind, serve in the background, report failure,
//! shut down within a bounded budget.
//!
//! ```text
//! Created ──start──> Listening ──notified──> ErrorNotified ──shutdown──> Stopped
//!    │                   │
//!    └─bind failure──> ErrorNotified         └──shutdown──> ShutdownRequested ──> Stopped
//! ```
//!
//! The serving loop runs on its own Tokio task so the owner can race
//! [`HttpServer::notified`] against an external shutdown signal.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Default budget for draining in-flight requests.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Lifecycle state of an [`HttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, not yet bound.
    Created,
    /// Bound and accepting connections.
    Listening,
    /// The serving loop (or the bind) failed and the failure was reported.
    ErrorNotified,
    /// Shutdown triggered, draining in-flight requests.
    ShutdownRequested,
    /// No longer serving.
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Listening => "listening",
            Self::ErrorNotified => "error_notified",
            Self::ShutdownRequested => "shutdown_requested",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Server lifecycle failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The serving loop stopped with an I/O error.
    #[error("server loop failed: {0}")]
    Serve(std::io::Error),

    /// The serving loop ended without reporting why.
    #[error("server loop terminated unexpectedly")]
    Terminated,

    /// The serving task panicked or was cancelled.
    #[error("serving task failed: {0}")]
    Task(String),

    /// In-flight requests did not drain within the budget.
    #[error("graceful shutdown exceeded {0:?}")]
    ShutdownTimeout(Duration),
}

/// Owns the listening socket and the background serving task.
#[derive(Debug)]
pub struct HttpServer {
    state: ServerState,
    router: Option<Router>,
    local_addr: Option<SocketAddr>,
    failure: Option<oneshot::Receiver<ServerError>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl HttpServer {
    /// Creates a server for `router` with the given drain budget.
    #[must_use]
    pub fn new(router: Router, shutdown_timeout: Duration) -> Self {
        Self {
            state: ServerState::Created,
            router: Some(router),
            local_addr: None,
            failure: None,
            shutdown: None,
            task: None,
            shutdown_timeout,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Bound address once listening (useful with port `0`).
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Binds `addr` and starts serving on a background task.
    ///
    /// A bind failure does not return an error: the server moves to
    /// [`ServerState::ErrorNotified`] and the failure is delivered by
    /// [`HttpServer::notified`]. Calling `start` twice is a no-op.
    pub async fn start(&mut self, addr: SocketAddr) {
        let Some(router) = self.router.take() else {
            tracing::warn!(state = %self.state, "server already started");
            return;
        };
        let (failure_tx, failure_rx) = oneshot::channel();
        self.failure = Some(failure_rx);

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                tracing::error!(%addr, error = %source, "failed to bind listener");
                let _ = failure_tx.send(ServerError::Bind { addr, source });
                self.state = ServerState::ErrorNotified;
                return;
            }
        };
        self.local_addr = listener.local_addr().ok();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown = Some(shutdown_tx);
        self.task = Some(tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(err) = served {
                tracing::error!(error = %err, "server loop failed");
                let _ = failure_tx.send(ServerError::Serve(err));
            }
        }));

        self.state = ServerState::Listening;
        tracing::info!(addr = ?self.local_addr, "server listening");
    }

    /// Resolves once, with the serving loop's terminal failure.
    ///
    /// Never resolves before [`HttpServer::start`] or after the failure has
    /// been taken. Cancel-safe: dropping the future keeps the notification.
    pub async fn notified(&mut self) -> ServerError {
        let Some(failure) = self.failure.as_mut() else {
            return std::future::pending().await;
        };
        let err = failure.await.unwrap_or(ServerError::Terminated);
        self.failure = None;
        if matches!(self.state, ServerState::Created | ServerState::Listening) {
            self.state = ServerState::ErrorNotified;
        }
        err
    }

    /// Stops accepting connections and waits for in-flight requests, at most
    /// for the configured budget. The server ends in
    /// [`ServerState::Stopped`] whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ShutdownTimeout`] when the drain exceeds the
    /// budget (the serving task is then aborted), or
    /// [`ServerError::Task`] when the serving task panicked.
    pub async fn shutdown(&mut self) -> Result<(), ServerError> {
        if self.state == ServerState::Stopped {
            return Ok(());
        }
        self.state = ServerState::ShutdownRequested;
        tracing::info!(timeout = ?self.shutdown_timeout, "shutting down server");

        if let Some(trigger) = self.shutdown.take() {
            let _ = trigger.send(());
        }

        let result = match self.task.take() {
            None => Ok(()),
            Some(mut task) => match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(join_err)) => Err(ServerError::Task(join_err.to_string())),
                Err(_) => {
                    task.abort();
                    Err(ServerError::ShutdownTimeout(self.shutdown_timeout))
                }
            },
        };

        self.state = ServerState::Stopped;
        tracing::info!("server stopped");
        result
    }
}
