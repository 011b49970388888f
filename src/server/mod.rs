//! HTTP server assembly
//!
//! Routes, shared state, and serving with graceful shutdown. All
//! collaborators — stores, gateway client, auth gate — are constructed once
//! at startup and injected through [`AppState`]; nothing in the request path
//! reaches for a global.

pub mod handlers;
pub mod router;

pub use router::build_router;

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::core::auth::AuthGate;
use crate::core::lifecycle::InvoiceLifecycle;
use crate::gateway::PaymentGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<InvoiceLifecycle>,

    /// Gateway client, also used directly by passthrough endpoints (bank list)
    pub gateway: Arc<dyn PaymentGateway>,

    pub auth: Arc<dyn AuthGate>,

    /// Shared secret verifying inbound webhook signatures
    pub webhook_secret: String,
}

/// Serve the application with graceful shutdown
///
/// Binds the address, serves requests, and handles SIGTERM and SIGINT
/// (Ctrl+C) for graceful shutdown.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
