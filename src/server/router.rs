//! Route table for the invoice-payment API

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::AppState;
use crate::server::handlers::{
    create_invoice, get_invoice, initiate_payment, list_banks, list_invoices,
};
use crate::webhook::handler::gateway_webhook;

/// Build the application router
///
/// - `POST /invoices` — create an invoice (authenticated)
/// - `GET  /invoices` — list the caller's invoices (authenticated)
/// - `GET  /invoices/{id}` — fetch an invoice (public; the share link)
/// - `POST /payments` — initiate a payment attempt (public)
/// - `GET  /banks` — gateway bank list passthrough (public)
/// - `POST /webhooks/gateway` — signed gateway callback
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/invoices", post(create_invoice).get(list_invoices))
        .route("/invoices/{id}", get(get_invoice))
        .route("/payments", post(initiate_payment))
        .route("/banks", get(list_banks))
        .route("/webhooks/gateway", post(gateway_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
