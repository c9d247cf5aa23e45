//! Best-effort authentication middleware.
//!
//! Attempts extraction and verification of both token kinds and publishes
//! whatever succeeded into the request extensions. A missing or invalid
//! token never fails the request here; rejection is the authorization
//! gate's job (see [`crate::authorize`]).

use crate::claims::ParsedToken;
use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::extract::{extract_access_token, extract_id_token};
use crate::verifier::TokenVerifier;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// Largest form body the middleware will buffer while looking for a token.
const FORM_BODY_LIMIT: usize = 1024 * 1024;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthnState {
    /// Token verifier with its key resolver and cache.
    pub verifier: Arc<TokenVerifier>,
}

impl AuthnState {
    /// Build middleware state from configuration.
    ///
    /// Each call creates its own key cache; registering the middleware
    /// twice yields two independent caches.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            verifier: Arc::new(TokenVerifier::new(config)),
        }
    }
}

/// Per-request authentication results, published into request extensions.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    /// Parsed access token, when one was extracted and verified.
    pub access_token: Option<ParsedToken>,

    /// Parsed identity token, when one was extracted and verified.
    pub id_token: Option<ParsedToken>,

    /// The access token's `sub` claim.
    pub subject: Option<String>,

    /// Roles derived from the access token's `scp`/`scope` claim.
    pub roles: Option<Vec<String>>,
}

/// Authentication middleware: enrich the request with token context.
///
/// Form-bodied requests are buffered (bounded) so the token search can see
/// the `access_token` field; the body is handed to the next stage intact.
///
/// This stage never rejects: on any extraction or verification failure the
/// request proceeds unauthenticated with the failure logged at debug.
#[instrument(skip_all, name = "authn.middleware")]
pub async fn oauth2_aware(
    State(state): State<Arc<AuthnState>>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    let (form_bytes, body) = if is_form_content_type(&parts.headers) {
        match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
            Ok(bytes) => {
                let replayed = Body::from(bytes.clone());
                (Some(bytes), replayed)
            }
            Err(e) => {
                tracing::warn!(
                    target: "authn.middleware",
                    error = %e,
                    "Failed to buffer form body; form token source unavailable"
                );
                (None, Body::empty())
            }
        }
    } else {
        (None, body)
    };

    let mut req = Request::from_parts(parts, body);

    let mut context = AuthContext::default();

    match access_token(&state, req.headers(), form_bytes.as_deref(), req.uri().query()).await {
        Ok(token) => {
            context.subject = token.claims.subject().map(ToString::to_string);
            match token.claims.roles() {
                Ok(roles) => context.roles = roles,
                Err(e) => {
                    tracing::debug!(
                        target: "authn.middleware",
                        error = %e,
                        "Access token roles could not be derived"
                    );
                }
            }
            context.access_token = Some(token);
        }
        Err(e) => {
            tracing::debug!(
                target: "authn.middleware",
                error = %e,
                "Request proceeds without access token"
            );
        }
    }

    match id_token(&state, req.headers()).await {
        Ok(token) => context.id_token = Some(token),
        Err(e) => {
            tracing::debug!(
                target: "authn.middleware",
                error = %e,
                "Request proceeds without identity token"
            );
        }
    }

    req.extensions_mut().insert(context);

    next.run(req).await
}

async fn access_token(
    state: &AuthnState,
    headers: &HeaderMap,
    form_body: Option<&[u8]>,
    query: Option<&str>,
) -> Result<ParsedToken, AuthError> {
    let raw = extract_access_token(headers, form_body, query)?;
    state.verifier.verify(&raw).await
}

async fn id_token(state: &AuthnState, headers: &HeaderMap) -> Result<ParsedToken, AuthError> {
    let raw = extract_id_token(headers)?;
    state.verifier.verify(&raw).await
}

fn is_form_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Extension trait for reading the published authentication context.
pub trait AuthContextExt {
    /// The authentication context, if the middleware ran on this request.
    fn auth_context(&self) -> Option<&AuthContext>;
}

impl<B> AuthContextExt for axum::http::Request<B> {
    fn auth_context(&self) -> Option<&AuthContext> {
        self.extensions().get::<AuthContext>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn authn_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AuthnState>();
    }

    #[test]
    fn form_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_form_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        assert!(is_form_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_form_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        assert!(!is_form_content_type(&headers));
    }

    #[test]
    fn auth_context_defaults_to_empty() {
        let context = AuthContext::default();
        assert!(context.access_token.is_none());
        assert!(context.id_token.is_none());
        assert!(context.subject.is_none());
        assert!(context.roles.is_none());
    }
}
