//! HTTP handler for the gateway webhook endpoint
//!
//! The body is taken raw: the signature covers the exact bytes on the wire,
//! so any re-serialization before verification would be a correctness bug.
//!
//! Response contract: `401` on signature failure, `200` on everything else.
//! The gateway redelivers anything that does not get a success-style
//! acknowledgment, so unknown events and unmatched references are
//! acknowledged after logging. A storage failure is the one exception; there
//! the event was not applied and a retry is exactly what we want.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::server::AppState;
use crate::webhook::{GatewayEvent, SIGNATURE_HEADER, verify_signature};

/// POST /webhooks/gateway
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&state.webhook_secret, &body, signature) {
        tracing::warn!("webhook rejected: bad or missing signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response();
    }

    let event: GatewayEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            // Signed but unparseable; acknowledge so the gateway stops
            // redelivering a payload we will never understand.
            tracing::warn!(error = %e, "webhook body did not match any known event shape");
            return (StatusCode::OK, Json(json!({ "message": "Ignored" }))).into_response();
        }
    };

    match event {
        GatewayEvent::ChargeSuccess { data } if data.is_successful() => {
            tracing::info!(tx_ref = %data.reference, "received charge.success webhook");
            match state
                .lifecycle
                .apply_charge_success(&data.reference, data.invoice_id(), data.amount)
                .await
            {
                Ok(_) => (StatusCode::OK, Json(json!({ "message": "Received" }))).into_response(),
                Err(err) => err.into_response(),
            }
        }
        GatewayEvent::ChargeSuccess { data } => {
            tracing::info!(
                tx_ref = %data.reference,
                status = %data.status,
                "charge.success without embedded success status ignored"
            );
            (StatusCode::OK, Json(json!({ "message": "Received" }))).into_response()
        }
        GatewayEvent::Other => {
            tracing::debug!("ignoring unhandled gateway event");
            (StatusCode::OK, Json(json!({ "message": "Received" }))).into_response()
        }
    }
}
