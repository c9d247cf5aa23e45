//! Key resolution: cache lookup, remote fetch, and algorithm enforcement.

use crate::cache::{KeyCache, SigningKey};
use crate::errors::AuthError;
use crate::jwks::{self, KeySetFetcher};
use jsonwebtoken::Algorithm;
use std::sync::Arc;
use tracing::instrument;

/// Resolves `(issuer, kid)` pairs to verification keys, caching results.
///
/// Concurrent misses for the same pair may fetch the same key set more than
/// once; the fetch is idempotent and the last writer wins, so this costs
/// only wasted work.
pub struct KeyResolver {
    /// Cache of previously resolved keys.
    cache: KeyCache,

    /// Remote key-set fetcher.
    fetcher: KeySetFetcher,
}

impl KeyResolver {
    /// Create a resolver with an empty cache.
    pub fn new(fetcher: KeySetFetcher) -> Self {
        Self {
            cache: KeyCache::new(),
            fetcher,
        }
    }

    /// The resolver's key cache, for preloading static keys.
    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Resolve the verification key for a token.
    ///
    /// The token's declared algorithm must match the key's algorithm, on
    /// the cached path as well as after a fetch: a token must never be
    /// verified under an algorithm the key was not published for.
    ///
    /// # Errors
    ///
    /// - `AuthError::Fetch` - the key set could not be retrieved or the
    ///   matched entry's material is unusable
    /// - `AuthError::KeyNotFound` - no entry in the fetched set has `kid`
    /// - `AuthError::AlgorithmMismatch` - declared and published algorithms
    ///   differ
    #[instrument(skip(self), fields(issuer = %issuer, kid = %kid))]
    pub async fn resolve(
        &self,
        issuer: &str,
        kid: &str,
        token_alg: Algorithm,
    ) -> Result<Arc<SigningKey>, AuthError> {
        if let Some(key) = self.cache.get(issuer, kid).await {
            if key.algorithm != token_alg {
                tracing::warn!(
                    target: "authn.resolver",
                    token_alg = ?token_alg,
                    key_alg = ?key.algorithm,
                    "Token algorithm does not match cached key"
                );
                return Err(AuthError::AlgorithmMismatch {
                    token_alg: format!("{token_alg:?}"),
                    key_alg: format!("{:?}", key.algorithm),
                });
            }
            tracing::debug!(target: "authn.resolver", "Signing key cache hit");
            return Ok(key);
        }

        let jwk_set = self.fetcher.fetch(issuer).await?;

        let jwk = jwk_set.key(kid).ok_or_else(|| {
            tracing::warn!(target: "authn.resolver", "Key id not present in fetched key set");
            AuthError::KeyNotFound {
                issuer: issuer.to_string(),
                kid: kid.to_string(),
            }
        })?;

        let declared_alg = jwk.alg.clone().unwrap_or_default();
        if declared_alg.parse::<Algorithm>().ok() != Some(token_alg) {
            tracing::warn!(
                target: "authn.resolver",
                token_alg = ?token_alg,
                key_alg = %declared_alg,
                "Algorithm mismatch between token header and key set entry"
            );
            return Err(AuthError::AlgorithmMismatch {
                token_alg: format!("{token_alg:?}"),
                key_alg: declared_alg,
            });
        }

        // TODO: honor the "use" field; only keys marked "sig" should be
        // trusted for signature verification.

        let key = Arc::new(SigningKey {
            kid: kid.to_string(),
            issuer: issuer.to_string(),
            algorithm: token_alg,
            key: jwks::decoding_key(jwk)?,
        });

        self.cache.put(key.clone()).await;
        tracing::info!(target: "authn.resolver", "Signing key cached");

        Ok(key)
    }
}
