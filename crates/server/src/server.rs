//! Listener setup and graceful shutdown.

use switchboard_core::{AppError, AppResult};
use tokio::net::TcpListener;

use crate::routes::create_router;
use crate::state::AppState;

/// Serve the API on `bind` until Ctrl+C.
pub async fn serve(state: AppState, bind: &str) -> AppResult<()> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;

    tracing::info!(address = %listener.local_addr()?, "Switchboard server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
