//! Raw-token extraction from request transport.
//!
//! The access token is searched in a fixed order: `Authorization` header
//! (bearer scheme, case-insensitive), then an `access_token` form field,
//! then an `access_token` query parameter. The identity token comes from
//! the `X-Id-Token` header only.

use crate::errors::AuthError;
use axum::http::{header, HeaderMap};

/// Header carrying the OpenID Connect identity token.
pub const ID_TOKEN_HEADER: &str = "x-id-token";

/// Form field / query parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

const BEARER_SCHEME: &str = "bearer ";

/// Extract the raw access token from a request.
///
/// `form_body` is the raw `application/x-www-form-urlencoded` body, when
/// the request carried one; `query` is the raw query string.
///
/// # Errors
///
/// - `AuthError::MalformedHeader` - the bearer scheme is present but
///   nothing follows it
/// - `AuthError::NoToken` - none of the three sources carries a token
pub fn extract_access_token(
    headers: &HeaderMap,
    form_body: Option<&[u8]>,
    query: Option<&str>,
) -> Result<String, AuthError> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        // Scheme matching is case-insensitive; the token keeps its casing
        let lowered = value.to_ascii_lowercase();
        if let Some(pos) = lowered.find(BEARER_SCHEME) {
            let raw = value
                .get(pos + BEARER_SCHEME.len()..)
                .unwrap_or_default();
            if raw.is_empty() {
                tracing::debug!(target: "authn.extract", "Bearer scheme present but no token follows");
                return Err(AuthError::MalformedHeader);
            }
            return Ok(raw.to_string());
        }
    }

    if let Some(body) = form_body {
        if let Some(token) = pair_value(body, ACCESS_TOKEN_PARAM) {
            return Ok(token);
        }
    }

    if let Some(query) = query {
        if let Some(token) = pair_value(query.as_bytes(), ACCESS_TOKEN_PARAM) {
            return Ok(token);
        }
    }

    Err(AuthError::NoToken)
}

/// Extract the raw identity token from the `X-Id-Token` header.
///
/// # Errors
///
/// Returns `AuthError::NoToken` when the header is absent or empty.
pub fn extract_id_token(headers: &HeaderMap) -> Result<String, AuthError> {
    headers
        .get(ID_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or(AuthError::NoToken)
}

/// First non-empty value for `name` in a urlencoded pair list.
fn pair_value(encoded: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(encoded)
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
