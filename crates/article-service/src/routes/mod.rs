//! HTTP routes.
//!
//! The router is constructed explicitly from configuration and handed to
//! the caller; no route table or middleware state lives in globals.

use crate::config::Config;
use crate::handlers;
use authn::{oauth2_aware, require_roles, AuthnState, RequiredRoles};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Role required by the identity-echo endpoint.
const ME_REQUIRED_ROLES: [&str; 1] = ["openid"];

/// Build the application routes.
///
/// - `/` and `/article/view/:article_id` - public article endpoints
/// - `/login` - redirect to `/`
/// - `/health` - liveness probe
/// - `/v1/me` - identity echo, gated on the `openid` role
pub fn build_routes(config: &Config) -> Router {
    // One authentication state (and thus one key cache) per router
    let authn_state = Arc::new(AuthnState::new(&config.auth_config()));

    let public_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/article/view/:article_id", get(handlers::get_article))
        .route("/login", get(handlers::login))
        .route("/health", get(handlers::health));

    // Gated routes; POST is routed too so the form token source is usable
    let protected_routes = Router::new()
        .route("/v1/me", get(handlers::me).post(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles::new(ME_REQUIRED_ROLES),
            require_roles,
        ));

    // Layer order (bottom-to-top execution):
    // 1. oauth2_aware - enrich the request with token context (innermost)
    // 2. TraceLayer - log request details
    // 3. TimeoutLayer - bound the whole request, key fetches included
    public_routes
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(authn_state, oauth2_aware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
