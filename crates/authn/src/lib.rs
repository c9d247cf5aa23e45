//! Bearer-token authentication middleware for axum services.
//!
//! Two composable pipeline stages:
//!
//! - [`oauth2_aware`]: best-effort enrichment. Extracts the OAuth2 access
//!   token (Authorization header, form field, or query parameter) and the
//!   OpenID Connect identity token (`X-Id-Token` header), verifies them
//!   against keys fetched from the issuer's JWKS endpoint, and publishes an
//!   [`AuthContext`] into the request extensions. Never rejects a request.
//! - [`require_roles`] / [`deny_all`]: the authorization gate. Rejects a
//!   request with 401 unless the published role set covers the required one.
//!
//! Verification keys are cached per `(issuer, key id)` for the process
//! lifetime; see [`KeyCache`].

pub mod authorize;
pub mod cache;
pub mod claims;
pub mod config;
pub mod errors;
pub mod extract;
pub mod jwks;
pub mod jwt;
pub mod middleware;
pub mod resolver;
pub mod verifier;

pub use authorize::{deny_all, require_roles, RequiredRoles};
pub use cache::{KeyCache, SigningKey};
pub use claims::{Claims, ParsedToken, TokenHeader};
pub use config::AuthConfig;
pub use errors::AuthError;
pub use jwks::{Jwk, JwkSet, KeySetFetcher};
pub use middleware::{oauth2_aware, AuthContext, AuthContextExt, AuthnState};
pub use resolver::KeyResolver;
pub use verifier::TokenVerifier;
