//! Article service configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; signature verification is on unless explicitly disabled.

use authn::AuthConfig;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8082";

/// Article service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server bind address (default: `0.0.0.0:8082`).
    pub bind_address: String,

    /// Verify token signatures (default: true). Disabling is only for
    /// trusted-network deployments.
    pub verify_tokens: bool,

    /// Explicit JWKS endpoint overriding issuer-derived fetching.
    pub jwks_url: Option<String>,

    /// OpenID Connect discovery endpoint (reserved, not consulted).
    pub discovery_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid VERIFY_TOKENS value: {0}")]
    InvalidVerifyTokens(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable has an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable has an unparseable value.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let verify_tokens = match vars.get("VERIFY_TOKENS") {
            None => true,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(ConfigError::InvalidVerifyTokens(format!(
                        "expected true/false, got '{other}'"
                    )))
                }
            },
        };

        let jwks_url = vars.get("AUTH_JWKS_URL").cloned();
        let discovery_url = vars.get("AUTH_DISCOVERY_URL").cloned();

        Ok(Config {
            bind_address,
            verify_tokens,
            jwks_url,
            discovery_url,
        })
    }

    /// The middleware configuration this service config implies.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            verify_tokens: self.verify_tokens,
            discovery_url: self.discovery_url.clone(),
            jwks_url: self.jwks_url.clone(),
        }
    }
}
