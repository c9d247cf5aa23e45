//! Signing-key cache.
//!
//! Maps `(issuer, key id)` to a verification key. Entries are immutable
//! once stored and live for the process lifetime: there is no eviction and
//! no TTL, an intentional policy, since the issuer/key-id cardinality of a
//! deployment is small and stable. A re-fetched key lands under a fresh
//! `(issuer, kid)` pair; existing entries are never mutated in place.
//!
//! One cache exists per middleware registration, not per process.

use jsonwebtoken::{Algorithm, DecodingKey};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A verification key resolved from an issuer's key set.
#[derive(Clone)]
pub struct SigningKey {
    /// Key id from the issuer's key set.
    pub kid: String,

    /// Issuer that published this key.
    pub issuer: String,

    /// Algorithm the key verifies.
    pub algorithm: Algorithm,

    /// Decoded verification key material.
    pub key: DecodingKey,
}

/// Key material is opaque and not printable.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("issuer", &self.issuer)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Concurrency-safe `(issuer, kid)` → [`SigningKey`] mapping.
///
/// Many concurrent readers, exclusive writer; a reader never observes a
/// partially written entry.
#[derive(Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<(String, String), Arc<SigningKey>>>,
}

impl KeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the key cached for `(issuer, kid)`.
    pub async fn get(&self, issuer: &str, kid: &str) -> Option<Arc<SigningKey>> {
        let entries = self.entries.read().await;
        entries
            .get(&(issuer.to_string(), kid.to_string()))
            .cloned()
    }

    /// Store a key under its own `(issuer, kid)` pair.
    pub async fn put(&self, key: Arc<SigningKey>) {
        let mut entries = self.entries.write().await;
        entries.insert((key.issuer.clone(), key.kid.clone()), key);
    }

    /// Number of cached keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
