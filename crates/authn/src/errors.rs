//! Authentication error types.
//!
//! Extraction and verification failures are swallowed by the enrichment
//! middleware and only logged; the authorization gate is the one stage that
//! turns an error into a response. The `IntoResponse` impl exists for the
//! gate and for handlers that surface these errors directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization error taxonomy.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token in any of the extraction sources.
    #[error("no bearer token present in request")]
    NoToken,

    /// Authorization header carries the bearer scheme but no token value.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Token structure could not be decoded, or a claim has the wrong shape.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token is outside its validity window (`exp`/`nbf`).
    #[error("token expired or not yet valid")]
    ExpiredToken,

    /// The issuer's key set has no entry for the token's key id.
    #[error("no key found for key id {kid} at issuer {issuer}")]
    KeyNotFound { issuer: String, kid: String },

    /// Token header algorithm differs from the signing key's algorithm.
    #[error("algorithm mismatch: token declares {token_alg}, key uses {key_alg}")]
    AlgorithmMismatch { token_alg: String, key_alg: String },

    /// Cryptographic signature verification failed.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Key set could not be fetched or decoded.
    #[error("failed to fetch key set: {0}")]
    Fetch(String),

    /// Published roles do not satisfy the route's required roles.
    #[error("not authorized")]
    Unauthorized,
}

impl AuthError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Fetch(_) => 503,
            _ => 401,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Not authorized".to_string(),
            ),
            AuthError::Fetch(reason) => {
                // Log the reason server-side, keep the client message generic
                tracing::warn!(target: "authn.errors", reason = %reason, "Key set unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "KEY_SET_UNAVAILABLE",
                    "Authentication service unavailable".to_string(),
                )
            }
            other => {
                tracing::debug!(target: "authn.errors", error = %other, "Token rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "The access token is invalid or expired".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer error=\"invalid_token\"".parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}
