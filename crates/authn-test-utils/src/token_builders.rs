//! Builders for test tokens and signing keys.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::json;

/// Deterministic Ed25519 keypair for signing test tokens.
pub struct TestKeypair {
    /// Key id advertised in tokens and the JWKS document.
    pub kid: String,
    public_key_bytes: Vec<u8>,
    private_key_pkcs8: Vec<u8>,
}

impl TestKeypair {
    /// Create a keypair from a one-byte seed; the same seed always yields
    /// the same keys.
    pub fn new(seed: u8, kid: &str) -> Self {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[0] = seed;
        for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
            *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
        }

        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
            .expect("Failed to create test keypair");

        let public_key_bytes = key_pair.public_key().as_ref().to_vec();
        let private_key_pkcs8 = build_pkcs8_from_seed(&seed_bytes);

        Self {
            kid: kid.to_string(),
            public_key_bytes,
            private_key_pkcs8,
        }
    }

    /// Sign a claims object as an EdDSA token carrying this key's `kid`.
    pub fn sign(&self, claims: &serde_json::Value) -> String {
        let encoding_key = EncodingKey::from_ed_der(&self.private_key_pkcs8);
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        header.kid = Some(self.kid.clone());

        encode(&header, claims, &encoding_key).expect("Failed to sign token")
    }

    /// This key as a JWKS entry.
    pub fn jwk(&self) -> serde_json::Value {
        json!({
            "kty": "OKP",
            "kid": self.kid,
            "crv": "Ed25519",
            "x": URL_SAFE_NO_PAD.encode(&self.public_key_bytes),
            "alg": "EdDSA",
            "use": "sig"
        })
    }

    /// A JWKS document containing only this key.
    pub fn jwks(&self) -> serde_json::Value {
        json!({ "keys": [self.jwk()] })
    }
}

/// Build a PKCS#8 v1 document from an Ed25519 seed.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::new();

    // Outer SEQUENCE tag
    pkcs8.push(0x30);
    pkcs8.push(0x2e); // Length: 46 bytes

    // Version: INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);

    // Algorithm Identifier: SEQUENCE
    pkcs8.push(0x30);
    pkcs8.push(0x05); // Length: 5 bytes
                      // OID for Ed25519: 1.3.101.112
    pkcs8.extend_from_slice(&[0x06, 0x03, 0x2b, 0x65, 0x70]);

    // Private Key: OCTET STRING
    pkcs8.push(0x04);
    pkcs8.push(0x22); // Length: 34 bytes
                      // Inner OCTET STRING with seed
    pkcs8.push(0x04);
    pkcs8.push(0x20); // Length: 32 bytes
    pkcs8.extend_from_slice(seed);

    pkcs8
}

/// Builder for test token claims.
///
/// # Example
///
/// ```rust,ignore
/// let claims = TokenBuilder::new()
///     .issuer("https://issuer.example.com/")
///     .for_user("alice")
///     .with_scp(&["read", "write"])
///     .expires_in(3600)
///     .build();
/// ```
pub struct TokenBuilder {
    claims: serde_json::Map<String, serde_json::Value>,
}

impl TokenBuilder {
    /// New builder with a default subject and a one-hour validity window.
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = serde_json::Map::new();
        claims.insert("sub".to_string(), json!("test-subject"));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(3600)).timestamp()),
        );
        claims.insert("iat".to_string(), json!(now.timestamp()));

        Self { claims }
    }

    /// Set the `iss` claim.
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.claims.insert("iss".to_string(), json!(issuer));
        self
    }

    /// Set the `sub` claim.
    pub fn for_user(mut self, subject: &str) -> Self {
        self.claims.insert("sub".to_string(), json!(subject));
        self
    }

    /// Set the `scp` claim as a list.
    pub fn with_scp(mut self, scopes: &[&str]) -> Self {
        self.claims.insert("scp".to_string(), json!(scopes));
        self
    }

    /// Set the `scope` claim as a space-separated string.
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.claims.insert("scope".to_string(), json!(scope));
        self
    }

    /// Set expiration in seconds from now (negative for an expired token).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(seconds)).timestamp()),
        );
        self
    }

    /// Set an arbitrary claim.
    pub fn claim(mut self, name: &str, value: serde_json::Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim set by default (e.g. `exp`).
    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Build the claims as a JSON value.
    pub fn build(self) -> serde_json::Value {
        serde_json::Value::Object(self.claims)
    }
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An unsigned token in compact serialization (empty signature segment).
pub fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = json!({"alg": "none", "typ": "JWT"});
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string().as_bytes()),
        URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes())
    )
}

/// A token with arbitrary header and claims and a junk signature. Useful
/// for exercising paths that must fail before signature verification.
pub fn forged_token(header: &serde_json::Value, claims: &serde_json::Value) -> String {
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(header.to_string().as_bytes()),
        URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_valid_claims() {
        let claims = TokenBuilder::new()
            .issuer("https://issuer/")
            .for_user("alice")
            .with_scp(&["read"])
            .build();

        assert_eq!(claims["iss"], "https://issuer/");
        assert_eq!(claims["sub"], "alice");
        assert_eq!(claims["scp"], json!(["read"]));
        assert!(claims["exp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn builder_default() {
        let claims = TokenBuilder::default().build();
        assert_eq!(claims["sub"], "test-subject");
    }

    #[test]
    fn without_removes_claims() {
        let claims = TokenBuilder::new().without("exp").build();
        assert!(claims.get("exp").is_none());
    }

    #[test]
    fn keypair_is_deterministic() {
        let a = TestKeypair::new(1, "k1");
        let b = TestKeypair::new(1, "k1");
        assert_eq!(a.jwk(), b.jwk());

        let c = TestKeypair::new(2, "k1");
        assert_ne!(a.jwk()["x"], c.jwk()["x"]);
    }

    #[test]
    fn signed_token_has_three_segments() {
        let keypair = TestKeypair::new(1, "k1");
        let token = keypair.sign(&TokenBuilder::new().build());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn unsigned_token_has_empty_signature() {
        let token = unsigned_token(&TokenBuilder::new().build());
        assert!(token.ends_with('.'));
        assert_eq!(token.split('.').count(), 3);
    }
}
