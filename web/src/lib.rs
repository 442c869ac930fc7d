use ::sse::Shutdown;
use log::*;
use tokio::net::TcpListener;

pub use service::AppState;

mod controller;
mod error;
mod middleware;
pub mod router;
mod sse;

pub use error::{Error, Result};

/// Binds the configured address and serves the API until Ctrl-C / SIGTERM or
/// until the shared shutdown signal fires. Open diagnostics streams are told to
/// finish so in-flight connections can drain.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.bind_address();
    let shutdown = app_state.shutdown.clone();

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = TcpListener::bind(&listen_addr).await?;
    let router = router::define_routes(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: Shutdown) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.triggered() => {},
    }

    info!("Shutdown requested, closing diagnostics streams");
    shutdown.trigger();
}
