//! Process wiring: open the store, build the service graph, serve until a
//! shutdown signal or a server failure, then drain.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;

use crate::api;
use crate::app_state::AppState;
use crate::config::{CalendarConfig, StoreBackend};
use crate::domain::StoreError;
use crate::persistence::{EventRepository, InMemoryEventRepository, SqliteEventRepository};
use crate::server::HttpServer;
use crate::service::EventService;

/// Runs the service with `config` until SIGINT/SIGTERM or a server failure.
///
/// # Errors
///
/// Fails when the store cannot be opened or the server reports a failure
/// (including a bind failure). A drain that overruns its budget is logged,
/// not returned.
pub async fn run(config: CalendarConfig) -> anyhow::Result<()> {
    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.store_backend,
        "starting calendar-gateway"
    );

    let repo = open_repository(&config)
        .await
        .with_context(|| format!("opening {} event store", config.store_backend))?;
    let events = Arc::new(EventService::new(repo));
    let app = api::build_app(AppState::new(events), config.request_timeout);

    let mut server = HttpServer::new(app, config.shutdown_timeout);
    server.start(config.listen_addr).await;
    let result = serve_until(&mut server, shutdown_signal()).await;
    tracing::info!(state = %server.state(), "calendar-gateway exited");
    result
}

/// Opens the configured event store.
///
/// # Errors
///
/// Returns [`StoreError::Persistence`] when the SQLite database cannot be
/// opened or its schema created.
pub async fn open_repository(
    config: &CalendarConfig,
) -> Result<Arc<dyn EventRepository>, StoreError> {
    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryEventRepository::new())),
        StoreBackend::Sqlite => {
            let repo =
                SqliteEventRepository::connect(&config.database_url, config.database_max_connections)
                    .await?;
            Ok(Arc::new(repo))
        }
    }
}

/// Waits for whichever comes first, `shutdown` or a server failure, then
/// shuts the server down.
///
/// # Errors
///
/// Returns the server failure when it won the race.
pub async fn serve_until<F>(server: &mut HttpServer, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let failure = tokio::select! {
        () = shutdown => {
            tracing::info!("shutdown signal received");
            None
        }
        err = server.notified() => {
            tracing::error!(error = %err, "server failed");
            Some(err)
        }
    };

    if let Err(err) = server.shutdown().await {
        tracing::warn!(error = %err, "graceful shutdown incomplete");
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
