//! Token parsing and signature verification.

use crate::claims::ParsedToken;
use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::jwks::KeySetFetcher;
use crate::jwt::{decode_claims_unverified, decode_token_header};
use crate::resolver::KeyResolver;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, Validation};
use std::collections::HashSet;
use tracing::instrument;

/// Parses tokens and, in verifying mode, checks their signatures against
/// keys resolved from the declared issuer.
///
/// Non-verifying mode decodes structure and claims only. It exists for
/// trusted-network deployments where a fronting proxy has already verified
/// the token; it must never be the default.
pub struct TokenVerifier {
    verify_tokens: bool,
    resolver: KeyResolver,
}

impl TokenVerifier {
    /// Create a verifier from middleware configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_resolver(
            config.verify_tokens,
            KeyResolver::new(KeySetFetcher::new(config.jwks_url.clone())),
        )
    }

    /// Create a verifier with an explicit resolver.
    pub fn with_resolver(verify_tokens: bool, resolver: KeyResolver) -> Self {
        Self {
            verify_tokens,
            resolver,
        }
    }

    /// The resolver backing this verifier.
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Whether this verifier checks signatures.
    pub fn verifies(&self) -> bool {
        self.verify_tokens
    }

    /// Parse a raw token, verifying its signature in verifying mode.
    ///
    /// Verifying mode needs the header `kid` and the `iss` claim to locate
    /// the key; a token missing either cannot proceed. Registered time
    /// claims (`exp`, `nbf`) are enforced during verification.
    ///
    /// # Errors
    ///
    /// - `AuthError::MalformedToken` - undecodable structure, or missing
    ///   `kid`/`iss` in verifying mode
    /// - `AuthError::ExpiredToken` - outside the token's validity window
    /// - `AuthError::InvalidSignature` - signature check failed
    /// - resolver errors (`Fetch`, `KeyNotFound`, `AlgorithmMismatch`)
    ///   propagate unchanged
    #[instrument(skip_all)]
    pub async fn verify(&self, raw: &str) -> Result<ParsedToken, AuthError> {
        let header = decode_token_header(raw)?;
        let claims = decode_claims_unverified(raw)?;

        if !self.verify_tokens {
            return Ok(ParsedToken {
                header,
                claims,
                verified: false,
            });
        }

        let kid = header.kid.clone().ok_or_else(|| {
            tracing::debug!(target: "authn.verifier", "Token header has no key id");
            AuthError::MalformedToken("token header has no key id".to_string())
        })?;

        let issuer = claims
            .issuer()
            .ok_or_else(|| {
                tracing::debug!(target: "authn.verifier", "Token has no issuer claim");
                AuthError::MalformedToken("token has no issuer claim".to_string())
            })?
            .to_string();

        let algorithm: Algorithm = header.alg.parse().map_err(|_| {
            tracing::debug!(target: "authn.verifier", alg = %header.alg, "Unknown token algorithm");
            AuthError::MalformedToken(format!("unknown token algorithm {}", header.alg))
        })?;

        let key = self.resolver.resolve(&issuer, &kid, algorithm).await?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;
        // Time claims are enforced when present; none is unconditionally required
        validation.required_spec_claims = HashSet::new();

        let token_data =
            decode(raw, &key.key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => {
                    tracing::debug!(target: "authn.verifier", "Token signature verification failed");
                    AuthError::InvalidSignature
                }
                ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                    tracing::debug!(target: "authn.verifier", "Token outside validity window");
                    AuthError::ExpiredToken
                }
                _ => {
                    tracing::debug!(target: "authn.verifier", error = %e, "Token verification failed");
                    AuthError::MalformedToken(e.to_string())
                }
            })?;

        tracing::debug!(target: "authn.verifier", "Token verified");

        Ok(ParsedToken {
            header,
            claims: token_data.claims,
            verified: true,
        })
    }
}
