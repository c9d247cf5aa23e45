//! Token claims and parsed-token types.
//!
//! Claims are kept as a JSON object with named accessors for the well-known
//! claims rather than a fixed struct: identity providers disagree on which
//! claims they emit, and downstream handlers still need access to the rest.
//! Cast failures surface as `MalformedToken`, never as panics. The `sub`
//! value is redacted in Debug output to keep user identifiers out of logs.

use crate::errors::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim holding the role/scope list, checked first.
pub const SCP_CLAIM: &str = "scp";

/// Fallback claim for roles, used only when `scp` is absent.
pub const SCOPE_CLAIM: &str = "scope";

/// Claims set of a token: a JSON object with typed accessors.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(serde_json::Map<String, serde_json::Value>);

impl From<serde_json::Map<String, serde_json::Value>> for Claims {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl Claims {
    /// Generic accessor for any claim.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// The `iss` claim, if present as a string.
    pub fn issuer(&self) -> Option<&str> {
        self.0.get("iss").and_then(|v| v.as_str())
    }

    /// The `sub` claim, if present as a string.
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(|v| v.as_str())
    }

    /// The `exp` claim, if present as a number (Unix epoch seconds).
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("exp").and_then(serde_json::Value::as_i64)
    }

    /// Derive the role set from the `scp` claim, falling back to `scope`
    /// only when `scp` is absent.
    ///
    /// Either claim may be a JSON array of strings or a single
    /// space-separated string. Any other shape is a malformed token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` when the claim is present but
    /// not a recognized shape.
    pub fn roles(&self) -> Result<Option<Vec<String>>, AuthError> {
        let value = match self.0.get(SCP_CLAIM).or_else(|| self.0.get(SCOPE_CLAIM)) {
            Some(value) => value,
            None => return Ok(None),
        };

        match value {
            serde_json::Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry.as_str().map(ToString::to_string).ok_or_else(|| {
                        AuthError::MalformedToken(
                            "scope list contains a non-string entry".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            serde_json::Value::String(scopes) => Ok(Some(
                scopes.split_whitespace().map(ToString::to_string).collect(),
            )),
            _ => Err(AuthError::MalformedToken(
                "scope claim has an unsupported shape".to_string(),
            )),
        }
    }
}

/// Redacts the `sub` value; user and client identifiers must not reach logs.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == "sub" {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

/// Decoded JOSE header fields relevant to verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenHeader {
    /// Declared signing algorithm name (e.g. `RS256`, `EdDSA`).
    pub alg: String,

    /// Key id selecting the signing key, when present.
    pub kid: Option<String>,
}

/// A decoded token: header, claims, and whether the signature was checked.
#[derive(Clone, Debug)]
pub struct ParsedToken {
    /// Decoded JOSE header.
    pub header: TokenHeader,

    /// Decoded claims set.
    pub claims: Claims,

    /// True when the signature was cryptographically verified.
    pub verified: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_from(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn named_accessors() {
        let claims = claims_from(json!({
            "iss": "https://issuer/",
            "sub": "u1",
            "exp": 1_234_567_890,
        }));

        assert_eq!(claims.issuer(), Some("https://issuer/"));
        assert_eq!(claims.subject(), Some("u1"));
        assert_eq!(claims.expires_at(), Some(1_234_567_890));
        assert!(claims.get("aud").is_none());
    }

    #[test]
    fn accessors_reject_wrong_types() {
        let claims = claims_from(json!({"iss": 42, "sub": ["u1"]}));

        assert!(claims.issuer().is_none());
        assert!(claims.subject().is_none());
    }

    #[test]
    fn roles_from_scp_array() {
        let claims = claims_from(json!({"scp": ["read", "write"]}));
        assert_eq!(
            claims.roles().unwrap(),
            Some(vec!["read".to_string(), "write".to_string()])
        );
    }

    #[test]
    fn roles_prefer_scp_over_scope() {
        let claims = claims_from(json!({
            "scp": ["read"],
            "scope": "admin",
        }));
        assert_eq!(claims.roles().unwrap(), Some(vec!["read".to_string()]));
    }

    #[test]
    fn roles_fall_back_to_scope_string() {
        let claims = claims_from(json!({"scope": "read write admin"}));
        assert_eq!(
            claims.roles().unwrap(),
            Some(vec![
                "read".to_string(),
                "write".to_string(),
                "admin".to_string()
            ])
        );
    }

    #[test]
    fn roles_accept_scope_array_and_scp_string() {
        let claims = claims_from(json!({"scope": ["read"]}));
        assert_eq!(claims.roles().unwrap(), Some(vec!["read".to_string()]));

        let claims = claims_from(json!({"scp": "read write"}));
        assert_eq!(
            claims.roles().unwrap(),
            Some(vec!["read".to_string(), "write".to_string()])
        );
    }

    #[test]
    fn roles_absent_when_no_scope_claims() {
        let claims = claims_from(json!({"sub": "u1"}));
        assert_eq!(claims.roles().unwrap(), None);
    }

    #[test]
    fn roles_cast_failure_is_malformed_token() {
        let claims = claims_from(json!({"scp": [1, 2]}));
        assert!(matches!(
            claims.roles(),
            Err(AuthError::MalformedToken(_))
        ));

        let claims = claims_from(json!({"scope": 42}));
        assert!(matches!(
            claims.roles(),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn debug_redacts_sub() {
        let claims = claims_from(json!({"sub": "secret-user-id", "iss": "https://issuer/"}));

        let debug_str = format!("{claims:?}");

        assert!(
            !debug_str.contains("secret-user-id"),
            "Debug output should not contain actual sub value"
        );
        assert!(
            debug_str.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(debug_str.contains("https://issuer/"));
    }

    #[test]
    fn serialization_round_trip() {
        let claims = claims_from(json!({"sub": "u1", "scp": ["read"]}));

        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, claims);
    }
}
