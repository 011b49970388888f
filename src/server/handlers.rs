//! HTTP handlers for invoice and payment operations
//!
//! Handlers translate between the wire and [`InvoiceLifecycle`]; no business
//! rules live here. Request payloads are validated per field before any
//! state is touched.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::core::error::PaylinkError;
use crate::core::invoice::InvoiceStatus;
use crate::core::lifecycle::{InvoiceSummary, PaymentInit};
use crate::gateway::Bank;
use crate::server::AppState;

/// Request body for creating an invoice
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    /// Caller-chosen invoice id, unique system-wide
    #[validate(length(min = 1, max = 32, message = "id must be 1-32 characters"))]
    pub id: String,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    /// Serialized invoice document; stored opaquely, parsed at the boundary
    pub data: String,
}

/// Request body for initiating a payment
#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    #[serde(rename = "invoiceId")]
    #[validate(length(min = 1, message = "invoiceId is required"))]
    pub invoice_id: String,

    #[validate(email(message = "a valid email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: String,
}

/// Public view of an invoice, served to any bearer of the link
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub name: String,
    pub status: InvoiceStatus,
    pub data: String,
    pub owner_id: String,
}

/// POST /invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Value>), PaylinkError> {
    let owner_id = state.auth.authenticate(&headers).await?;
    payload.validate()?;

    let id = state
        .lifecycle
        .create_invoice(&owner_id, &payload.id, &payload.name, &payload.data)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<InvoiceSummary>>, PaylinkError> {
    let owner_id = state.auth.authenticate(&headers).await?;
    let invoices = state.lifecycle.list_invoices(&owner_id).await?;
    Ok(Json(invoices))
}

/// GET /invoices/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceView>, PaylinkError> {
    let invoice = state.lifecycle.get_invoice(&id).await?;
    Ok(Json(InvoiceView {
        name: invoice.name,
        status: invoice.status,
        data: invoice.document,
        owner_id: invoice.owner_id,
    }))
}

/// POST /payments
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<Json<PaymentInit>, PaylinkError> {
    payload.validate()?;
    let init = state
        .lifecycle
        .initiate_payment(&payload.invoice_id, &payload.email, &payload.name)
        .await?;
    Ok(Json(init))
}

/// GET /banks
pub async fn list_banks(State(state): State<AppState>) -> Result<Json<Vec<Bank>>, PaylinkError> {
    let banks = state.gateway.list_banks("nigeria", "NGN").await?;
    Ok(Json(banks))
}
