//! Middleware configuration.

/// Configuration for the authentication middleware.
///
/// The default posture verifies signatures; disabling verification is only
/// for trusted-network deployments and must be an explicit choice.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Verify token signatures against the issuer's key set.
    pub verify_tokens: bool,

    /// OpenID Connect discovery endpoint. Reserved: discovery-document
    /// parsing is out of scope and this field is currently not consulted.
    pub discovery_url: Option<String>,

    /// Explicit JWKS endpoint. When set, it replaces the issuer-derived
    /// `<issuer>.well-known/jwks.json` URL for every issuer.
    pub jwks_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_tokens: true,
            discovery_url: None,
            jwks_url: None,
        }
    }
}
