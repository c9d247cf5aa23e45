//! Raw-token decoding helpers.
//!
//! Decodes the JOSE header and the claims set of a compact-serialized token
//! without verifying the signature. Used by the verifier to learn which key
//! a token was signed with (issuer + key id) before the key is available,
//! and as the whole of non-verifying mode.
//!
//! Tokens are size-checked BEFORE any base64 or JSON work (DoS prevention).

use crate::claims::{Claims, TokenHeader};
use crate::errors::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Maximum allowed token size in bytes (8 KiB).
///
/// Typical tokens are a few hundred bytes; anything near this limit is
/// either misuse or an attack on the base64/JSON decoding path. Checked
/// before any decoding work.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Split a compact-serialized token into its three segments.
fn token_segments(token: &str) -> Result<(&str, &str), AuthError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "authn.jwt",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AuthError::MalformedToken(
            "token exceeds size limit".to_string(),
        ));
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(_signature), None) => Ok((header, payload)),
        _ => {
            tracing::debug!(target: "authn.jwt", "Token rejected: not a three-segment token");
            Err(AuthError::MalformedToken(
                "token is not in compact serialization".to_string(),
            ))
        }
    }
}

fn decode_segment(segment: &str) -> Result<serde_json::Value, AuthError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "authn.jwt", error = %e, "Failed to decode token segment base64");
        AuthError::MalformedToken("token segment is not base64url".to_string())
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::debug!(target: "authn.jwt", error = %e, "Failed to parse token segment JSON");
        AuthError::MalformedToken("token segment is not valid JSON".to_string())
    })
}

/// Decode the JOSE header of a token without verifying the signature.
///
/// The algorithm name is required; the key id is optional and empty values
/// are treated as absent.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token is oversized, not in
/// compact serialization, or the header segment cannot be decoded.
pub fn decode_token_header(token: &str) -> Result<TokenHeader, AuthError> {
    let (header_segment, _) = token_segments(token)?;
    let header = decode_segment(header_segment)?;

    let alg = header
        .get("alg")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| AuthError::MalformedToken("token header has no algorithm".to_string()))?;

    let kid = header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    Ok(TokenHeader { alg, kid })
}

/// Decode the claims set of a token without verifying the signature.
///
/// The caller MUST NOT trust these claims for anything but key lookup until
/// the signature has been verified.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token is oversized, not in
/// compact serialization, or the payload is not a JSON object.
pub fn decode_claims_unverified(token: &str) -> Result<Claims, AuthError> {
    let (_, payload_segment) = token_segments(token)?;
    let payload = decode_segment(payload_segment)?;

    match payload {
        serde_json::Value::Object(map) => Ok(Claims::from(map)),
        _ => {
            tracing::debug!(target: "authn.jwt", "Token rejected: claims set is not an object");
            Err(AuthError::MalformedToken(
                "token claims set is not a JSON object".to_string(),
            ))
        }
    }
}
