//! Typed error handling for the paylink service
//!
//! Every fallible operation in the crate resolves to [`PaylinkError`], a
//! hierarchy of category enums that map cleanly onto HTTP responses.
//!
//! # Error Categories
//!
//! - [`InvoiceError`]: invoice lifecycle violations (not found, already paid, ...)
//! - [`GatewayError`]: remote payment-provider failures
//! - [`ValidationError`]: malformed caller input, surfaced per field
//! - [`StorageError`]: store backend failures
//!
//! Business-rule and validation errors carry caller-facing messages.
//! Infrastructure errors (storage, gateway transport) are logged with full
//! detail server-side and reduced to a generic message in the response body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// The main error type for the paylink service
#[derive(Debug)]
pub enum PaylinkError {
    /// Invoice lifecycle errors
    Invoice(InvoiceError),

    /// Remote payment-gateway errors
    Gateway(GatewayError),

    /// Input validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Missing or invalid caller credentials, or a failed webhook signature
    Unauthorized,

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for PaylinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaylinkError::Invoice(e) => write!(f, "{}", e),
            PaylinkError::Gateway(e) => write!(f, "{}", e),
            PaylinkError::Validation(e) => write!(f, "{}", e),
            PaylinkError::Storage(e) => write!(f, "{}", e),
            PaylinkError::Unauthorized => write!(f, "Unauthorized"),
            PaylinkError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PaylinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaylinkError::Invoice(e) => Some(e),
            PaylinkError::Gateway(e) => Some(e),
            PaylinkError::Validation(e) => Some(e),
            PaylinkError::Storage(e) => Some(e),
            PaylinkError::Unauthorized => None,
            PaylinkError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PaylinkError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaylinkError::Invoice(e) => e.status_code(),
            PaylinkError::Gateway(_) => StatusCode::BAD_GATEWAY,
            PaylinkError::Validation(_) => StatusCode::BAD_REQUEST,
            PaylinkError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PaylinkError::Unauthorized => StatusCode::UNAUTHORIZED,
            PaylinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PaylinkError::Invoice(e) => e.error_code(),
            PaylinkError::Gateway(_) => "GATEWAY_ERROR",
            PaylinkError::Validation(_) => "VALIDATION_ERROR",
            PaylinkError::Storage(_) => "STORAGE_ERROR",
            PaylinkError::Unauthorized => "UNAUTHORIZED",
            PaylinkError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to a caller-facing error response
    ///
    /// Infrastructure failures never leak their internal message here; the
    /// detail stays in the server log.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            PaylinkError::Gateway(_) => {
                "The payment provider could not be reached. Please try again later.".to_string()
            }
            PaylinkError::Storage(_) | PaylinkError::Internal(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PaylinkError::Invoice(InvoiceError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            PaylinkError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    /// Wrap a store failure, preserving the underlying cause for the log
    pub fn storage(err: anyhow::Error) -> Self {
        PaylinkError::Storage(StorageError(format!("{:#}", err)))
    }
}

impl IntoResponse for PaylinkError {
    fn into_response(self) -> Response {
        match &self {
            PaylinkError::Gateway(e) => tracing::error!(error = %e, "gateway failure"),
            PaylinkError::Storage(e) => tracing::error!(error = %e, "storage failure"),
            PaylinkError::Internal(msg) => tracing::error!(error = %msg, "internal failure"),
            _ => {}
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Invoice Errors
// =============================================================================

/// Errors related to the invoice lifecycle
#[derive(Debug)]
pub enum InvoiceError {
    /// Invoice was not found
    NotFound { id: String },

    /// Invoice id is already taken
    AlreadyExists { id: String },

    /// Invoice has already been settled; no further payment may be initiated
    AlreadyPaid { id: String },

    /// The stored document payload could not be parsed
    InvalidDocument { message: String },
}

impl fmt::Display for InvoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceError::NotFound { id } => {
                write!(f, "invoice '{}' not found", id)
            }
            InvoiceError::AlreadyExists { id } => {
                write!(f, "invoice '{}' already exists", id)
            }
            InvoiceError::AlreadyPaid { id } => {
                write!(f, "invoice '{}' has already been paid", id)
            }
            InvoiceError::InvalidDocument { message } => {
                write!(f, "invalid invoice document: {}", message)
            }
        }
    }
}

impl std::error::Error for InvoiceError {}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InvoiceError::AlreadyExists { .. } => StatusCode::CONFLICT,
            InvoiceError::AlreadyPaid { .. } => StatusCode::CONFLICT,
            InvoiceError::InvalidDocument { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::NotFound { .. } => "INVOICE_NOT_FOUND",
            InvoiceError::AlreadyExists { .. } => "INVOICE_ALREADY_EXISTS",
            InvoiceError::AlreadyPaid { .. } => "INVOICE_ALREADY_PAID",
            InvoiceError::InvalidDocument { .. } => "INVALID_DOCUMENT",
        }
    }
}

impl From<InvoiceError> for PaylinkError {
    fn from(err: InvoiceError) -> Self {
        PaylinkError::Invoice(err)
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors reported by or on the way to the remote payment gateway
///
/// No retry policy lives at this level; callers decide whether a failure is
/// worth retrying.
#[derive(Debug)]
pub enum GatewayError {
    /// The gateway answered with a non-success envelope; carries the remote message
    Declined { message: String },

    /// The gateway could not be reached or the response could not be read
    Transport { message: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Declined { message } => {
                write!(f, "gateway declined the request: {}", message)
            }
            GatewayError::Transport { message } => {
                write!(f, "gateway transport failure: {}", message)
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for PaylinkError {
    fn from(err: GatewayError) -> Self {
        PaylinkError::Gateway(err)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Per-field validation failures (field name -> message)
    FieldErrors(HashMap<String, String>),

    /// A single malformed value outside any particular field
    Invalid(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                write!(f, "validation failed for {} field(s)", errors.len())
            }
            ValidationError::Invalid(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for PaylinkError {
    fn from(err: ValidationError) -> Self {
        PaylinkError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for PaylinkError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .collect();
        PaylinkError::Validation(ValidationError::FieldErrors(fields))
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Opaque store backend failure
///
/// The message is for the server log only; callers see a generic response.
#[derive(Debug)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage failure: {}", self.0)
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_error_status_codes() {
        let not_found = PaylinkError::Invoice(InvoiceError::NotFound {
            id: "inv-1".to_string(),
        });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.error_code(), "INVOICE_NOT_FOUND");

        let paid = PaylinkError::Invoice(InvoiceError::AlreadyPaid {
            id: "inv-1".to_string(),
        });
        assert_eq!(paid.status_code(), StatusCode::CONFLICT);
        assert_eq!(paid.error_code(), "INVOICE_ALREADY_PAID");
    }

    #[test]
    fn test_infrastructure_errors_hide_detail() {
        let err = PaylinkError::storage(anyhow::anyhow!("connection refused on 10.0.0.3:5432"));
        let response = err.to_response();
        assert_eq!(response.code, "STORAGE_ERROR");
        assert!(!response.message.contains("10.0.0.3"));

        let err = PaylinkError::Gateway(GatewayError::Transport {
            message: "dns lookup failed for internal host".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "GATEWAY_ERROR");
        assert!(!response.message.contains("dns"));
    }

    #[test]
    fn test_validation_error_carries_field_details() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "invalid email address".to_string());
        let err = PaylinkError::Validation(ValidationError::FieldErrors(fields));
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("field errors should be detailed");
        assert_eq!(details["fields"]["email"], "invalid email address");
    }

    #[test]
    fn test_unauthorized_is_minimal() {
        let err = PaylinkError::Unauthorized;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let response = err.to_response();
        assert_eq!(response.message, "Unauthorized");
        assert!(response.details.is_none());
    }
}
