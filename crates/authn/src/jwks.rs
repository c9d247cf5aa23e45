//! JWKS (JSON Web Key Set) wire types and remote fetching.
//!
//! The fetcher derives the key-set URL from the token's issuer by direct
//! concatenation with `.well-known/jwks.json`, so whether the issuer carries
//! a trailing slash decides the final URL. A configured JWKS URL overrides
//! the derivation for every issuer.
//!
//! Fetches are not retried and failures are not cached: a failed fetch is
//! attempted again by the next request that needs the same key.

use crate::errors::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::time::Duration;

/// Suffix appended to the issuer URL when no explicit JWKS URL is configured.
pub const WELL_KNOWN_JWKS_SUFFIX: &str = ".well-known/jwks.json";

/// HTTP client timeout for key-set fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A single key entry from a JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (`RSA`, `EC`, or `OKP`).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    #[serde(default)]
    pub kid: Option<String>,

    /// Algorithm the key signs with.
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (`sig` for signing keys).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,

    /// Curve name for EC and OKP keys.
    #[serde(default)]
    pub crv: Option<String>,

    /// EC x coordinate, or the OKP public key (base64url).
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url).
    #[serde(default)]
    pub y: Option<String>,
}

/// A JWKS document: the ordered key entries published by an issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find the first entry with the given key id.
    pub fn key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// Fetches JWKS documents over HTTP.
pub struct KeySetFetcher {
    /// HTTP client for fetching key sets.
    http_client: reqwest::Client,

    /// Explicit JWKS URL; overrides issuer derivation when set.
    jwks_url_override: Option<String>,
}

impl KeySetFetcher {
    /// Create a fetcher.
    ///
    /// # Arguments
    ///
    /// * `jwks_url_override` - explicit JWKS endpoint; when `None`, the URL
    ///   is derived from each token's issuer claim
    pub fn new(jwks_url_override: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "authn.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            http_client,
            jwks_url_override,
        }
    }

    /// The URL the key set for `issuer` will be fetched from.
    pub fn jwks_url(&self, issuer: &str) -> String {
        match &self.jwks_url_override {
            Some(url) => url.clone(),
            None => format!("{issuer}{WELL_KNOWN_JWKS_SUFFIX}"),
        }
    }

    /// Fetch and decode the key set for an issuer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Fetch` on transport failure, a non-success
    /// status, or an undecodable body.
    pub async fn fetch(&self, issuer: &str) -> Result<JwkSet, AuthError> {
        let url = self.jwks_url(issuer);
        tracing::debug!(target: "authn.jwks", url = %url, "Fetching JWKS");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            tracing::error!(target: "authn.jwks", url = %url, error = %e, "Failed to fetch JWKS");
            AuthError::Fetch(format!("request to {url} failed: {e}"))
        })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "authn.jwks",
                url = %url,
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::Fetch(format!(
                "{url} returned status {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!(target: "authn.jwks", url = %url, error = %e, "Failed to parse JWKS response");
            AuthError::Fetch(format!("response from {url} is not a key set: {e}"))
        })?;

        tracing::debug!(
            target: "authn.jwks",
            url = %url,
            key_count = jwks.keys.len(),
            "JWKS fetched"
        );

        Ok(jwks)
    }
}

/// Convert a JWK entry into a verification key.
///
/// # Errors
///
/// Returns `AuthError::Fetch` when the entry's key type is unsupported or
/// required material is missing or undecodable.
pub(crate) fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk
                .n
                .as_ref()
                .ok_or_else(|| AuthError::Fetch("RSA key entry missing 'n'".to_string()))?;
            let e = jwk
                .e
                .as_ref()
                .ok_or_else(|| AuthError::Fetch("RSA key entry missing 'e'".to_string()))?;

            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| AuthError::Fetch(format!("invalid RSA key components: {e}")))
        }
        "EC" => {
            let x = jwk
                .x
                .as_ref()
                .ok_or_else(|| AuthError::Fetch("EC key entry missing 'x'".to_string()))?;
            let y = jwk
                .y
                .as_ref()
                .ok_or_else(|| AuthError::Fetch("EC key entry missing 'y'".to_string()))?;

            DecodingKey::from_ec_components(x, y)
                .map_err(|e| AuthError::Fetch(format!("invalid EC key components: {e}")))
        }
        "OKP" => {
            let x = jwk
                .x
                .as_ref()
                .ok_or_else(|| AuthError::Fetch("OKP key entry missing 'x'".to_string()))?;

            let public_key_bytes = URL_SAFE_NO_PAD
                .decode(x)
                .map_err(|e| AuthError::Fetch(format!("invalid OKP public key encoding: {e}")))?;

            Ok(DecodingKey::from_ed_der(&public_key_bytes))
        }
        other => Err(AuthError::Fetch(format!("unsupported key type {other}"))),
    }
}
