//! Authentication gate
//!
//! Caller identity is issued by an external collaborator (an identity
//! provider). This crate only consumes it: the [`AuthGate`] trait resolves a
//! stable user identifier from request headers, and invoice creation/listing
//! are scoped to that identifier. Invoice retrieval and payment initiation
//! stay public by design; bearing the invoice link is the sharing mechanism.

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use std::collections::HashMap;

use crate::core::error::PaylinkError;

/// Trait for resolving caller identity from a request
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Extract the stable user id for the caller
    ///
    /// Fails with [`PaylinkError::Unauthorized`] when credentials are missing
    /// or unknown; no further detail is surfaced.
    async fn authenticate(&self, headers: &HeaderMap) -> Result<String, PaylinkError>;
}

/// Static bearer-token gate
///
/// Maps pre-issued opaque tokens to user ids. Suitable for deployments where
/// a fronting identity provider mints the tokens and this service only needs
/// the mapping.
pub struct BearerTokenAuth {
    tokens: HashMap<String, String>,
}

impl BearerTokenAuth {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthGate for BearerTokenAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<String, PaylinkError> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(PaylinkError::Unauthorized)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(PaylinkError::Unauthorized)?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or(PaylinkError::Unauthorized)
    }
}

/// Development gate that trusts the `x-user-id` header verbatim
///
/// Never deploy this behind an open network edge.
pub struct HeaderAuth;

#[async_trait]
impl AuthGate for HeaderAuth {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<String, PaylinkError> {
        headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .ok_or(PaylinkError::Unauthorized)
    }
}
