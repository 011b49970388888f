//! Paylink server binary
//!
//! Wires configuration, stores, the gateway client, and the auth gate into
//! one [`AppState`] and serves until SIGTERM/Ctrl+C.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use paylink::config::{AppConfig, AuthMode};
use paylink::core::auth::{AuthGate, BearerTokenAuth, HeaderAuth};
use paylink::core::lifecycle::InvoiceLifecycle;
use paylink::core::store::{InvoiceStore, PaymentStore};
use paylink::gateway::PaystackClient;
use paylink::server::{AppState, serve};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("PAYLINK_CONFIG").unwrap_or_else(|_| "paylink.yaml".to_string());
    let config = AppConfig::from_yaml_file(&config_path)?;

    let (invoices, payments) = build_stores(&config).await?;

    let gateway = Arc::new(PaystackClient::new(&config.gateway)?);
    let lifecycle = Arc::new(InvoiceLifecycle::new(
        invoices,
        payments,
        gateway.clone(),
    ));

    let auth: Arc<dyn AuthGate> = match config.auth.mode {
        AuthMode::Bearer => Arc::new(BearerTokenAuth::new(config.auth.tokens.clone())),
        AuthMode::Header => {
            tracing::warn!("header auth mode enabled; do not expose this to untrusted networks");
            Arc::new(HeaderAuth)
        }
    };

    let state = AppState {
        lifecycle,
        gateway,
        auth,
        webhook_secret: config.gateway.secret_key.clone(),
    };

    serve(state, &config.server.bind_addr).await
}

#[cfg(feature = "postgres")]
async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn InvoiceStore>, Arc<dyn PaymentStore>)> {
    use paylink::storage::postgres::{PostgresInvoiceStore, PostgresPaymentStore, ensure_schema};

    let Some(url) = config.database.url.as_deref() else {
        anyhow::bail!("postgres backend selected but database.url is not configured");
    };
    let pool = sqlx::PgPool::connect(url).await?;
    ensure_schema(&pool).await?;
    tracing::info!("using postgres store");
    Ok((
        Arc::new(PostgresInvoiceStore::new(pool.clone())),
        Arc::new(PostgresPaymentStore::new(pool)),
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(
    _config: &AppConfig,
) -> Result<(Arc<dyn InvoiceStore>, Arc<dyn PaymentStore>)> {
    use paylink::storage::{InMemoryInvoiceStore, InMemoryPaymentStore};

    tracing::info!("using in-memory store; state is lost on restart");
    Ok((
        Arc::new(InMemoryInvoiceStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
    ))
}
