//! Configuration loading and management
//!
//! Configuration comes from a YAML file; the gateway secret may also be
//! supplied (or overridden) through `PAYLINK_GATEWAY_SECRET` so deployments
//! never have to write it to disk. The same secret signs inbound webhooks,
//! matching the provider's scheme.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable overriding `gateway.secret_key`
pub const GATEWAY_SECRET_ENV: &str = "PAYLINK_GATEWAY_SECRET";

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_currency() -> String {
    "NGN".to_string()
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0:3000"
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Payment gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the provider's REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret API key; also the webhook signing secret
    #[serde(default)]
    pub secret_key: String,

    /// Settlement currency for all charges
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            currency: default_currency(),
        }
    }
}

/// Caller authentication settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// "bearer" (static token map) or "header" (trust x-user-id, dev only)
    #[serde(default)]
    pub mode: AuthMode,

    /// token -> user id map for bearer mode
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Bearer,
    Header,
}

/// Optional database settings, used by the `postgres` backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file and apply environment overrides
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file '{}'", path))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string (no environment overrides)
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("parsing config")?;
        Ok(config)
    }

    /// Pull secrets from the environment
    pub fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var(GATEWAY_SECRET_ENV) {
            if !secret.is_empty() {
                self.gateway.secret_key = secret;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.gateway.secret_key.is_empty() {
            bail!(
                "gateway secret is not configured; set gateway.secret_key or {}",
                GATEWAY_SECRET_ENV
            );
        }
        Ok(())
    }
}
