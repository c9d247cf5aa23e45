//! Authorization gate.
//!
//! The second pipeline stage: where [`crate::middleware::oauth2_aware`]
//! only annotates, this stage rejects. Attach per route with
//! `route_layer(middleware::from_fn_with_state(RequiredRoles::new([...]),
//! require_roles))`.

use crate::errors::AuthError;
use crate::middleware::AuthContext;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Role set a route requires.
#[derive(Clone, Debug)]
pub struct RequiredRoles(Arc<Vec<String>>);

impl RequiredRoles {
    /// Require every role in `roles`.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(roles.into_iter().map(Into::into).collect()))
    }

    /// An empty requirement: allows every request.
    pub fn none() -> Self {
        Self(Arc::new(Vec::new()))
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every required role must be present; order and duplicates are
    /// irrelevant.
    fn satisfied_by(&self, published: &[String]) -> bool {
        self.0.iter().all(|role| published.contains(role))
    }
}

/// Authorization middleware: reject unless the published roles cover the
/// required set.
///
/// An empty requirement allows every request, including requests with no
/// published roles at all. Otherwise a missing context, a missing role
/// set, or an unsatisfied requirement ends the request with 401.
///
/// # Errors
///
/// Returns `AuthError::Unauthorized` when the requirement is not met.
pub async fn require_roles(
    State(required): State<RequiredRoles>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if required.is_empty() {
        return Ok(next.run(req).await);
    }

    let published = req
        .extensions()
        .get::<AuthContext>()
        .and_then(|context| context.roles.as_deref());

    match published {
        Some(roles) if required.satisfied_by(roles) => {
            tracing::debug!(target: "authn.authorize", "Request authorized");
            Ok(next.run(req).await)
        }
        _ => {
            tracing::debug!(
                target: "authn.authorize",
                required = ?required.0,
                "Request lacks required roles"
            );
            Err(AuthError::Unauthorized)
        }
    }
}

/// Gate that rejects every request.
///
/// # Errors
///
/// Always returns `AuthError::Unauthorized`.
pub async fn deny_all(_req: Request, _next: Next) -> Result<Response, AuthError> {
    Err(AuthError::Unauthorized)
}
