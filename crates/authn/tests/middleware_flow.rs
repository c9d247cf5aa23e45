//! Middleware and gate tests over an in-process router.
//!
//! Signature verification is disabled here so the pipeline can be driven
//! without a key server; the verifier's own behavior is covered in
//! `verify_flow.rs`.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use authn::{
    deny_all, oauth2_aware, require_roles, AuthConfig, AuthContext, AuthnState, RequiredRoles,
};
use authn_test_utils::{unsigned_token, TokenBuilder};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

/// Echoes the published context so tests can observe enrichment.
async fn probe(Extension(context): Extension<AuthContext>) -> Json<serde_json::Value> {
    Json(json!({
        "subject": context.subject,
        "roles": context.roles,
        "has_access_token": context.access_token.is_some(),
        "has_id_token": context.id_token.is_some(),
    }))
}

fn app(required: RequiredRoles) -> Router {
    let state = Arc::new(AuthnState::new(&AuthConfig {
        verify_tokens: false,
        ..AuthConfig::default()
    }));

    let public = Router::new().route("/probe", get(probe).post(probe));

    let gated = Router::new()
        .route("/gated", get(probe))
        .route_layer(middleware::from_fn_with_state(required, require_roles));

    let denied = Router::new()
        .route("/denied", get(probe))
        .route_layer(middleware::from_fn(deny_all));

    public
        .merge(gated)
        .merge(denied)
        .layer(middleware::from_fn_with_state(state, oauth2_aware))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn user_token(scopes: &[&str]) -> String {
    unsigned_token(&TokenBuilder::new().for_user("u1").with_scp(scopes).build())
}

#[tokio::test]
async fn bearer_token_populates_subject_and_roles() {
    let token = unsigned_token(
        &TokenBuilder::new()
            .for_user("u1")
            .with_scp(&["read", "write"])
            .build(),
    );

    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .uri("/probe")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subject"], "u1");
    assert_eq!(body["roles"], json!(["read", "write"]));
    assert_eq!(body["has_access_token"], true);
    assert_eq!(body["has_id_token"], false);
}

#[tokio::test]
async fn missing_token_does_not_fail_the_request() {
    let response = app(RequiredRoles::none())
        .oneshot(Request::builder().uri("/probe").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subject"], serde_json::Value::Null);
    assert_eq!(body["has_access_token"], false);
}

#[tokio::test]
async fn undecodable_token_does_not_fail_the_request() {
    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .uri("/probe")
                .header("Authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["has_access_token"], false);
}

#[tokio::test]
async fn id_token_is_published_independently() {
    let id_token = unsigned_token(&TokenBuilder::new().for_user("u1").build());

    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .uri("/probe")
                .header("X-Id-Token", id_token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["has_access_token"], false);
    assert_eq!(body["has_id_token"], true);
    // Roles never derive from the identity token
    assert_eq!(body["subject"], serde_json::Value::Null);
    assert_eq!(body["roles"], serde_json::Value::Null);
}

#[tokio::test]
async fn form_body_token_source_reaches_the_handler() {
    let token = user_token(&["read"]);

    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/probe")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("access_token={token}")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subject"], "u1");
}

#[tokio::test]
async fn query_parameter_token_source_reaches_the_handler() {
    let token = user_token(&["read"]);

    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .uri(format!("/probe?access_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subject"], "u1");
}

#[tokio::test]
async fn empty_requirement_allows_requests_without_any_roles() {
    let response = app(RequiredRoles::none())
        .oneshot(Request::builder().uri("/gated").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_rejects_request_without_roles() {
    let response = app(RequiredRoles::new(["admin"]))
        .oneshot(Request::builder().uri("/gated").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("WWW-Authenticate").is_some());
}

#[tokio::test]
async fn gate_rejects_insufficient_roles() {
    let token = user_token(&["user"]);

    let response = app(RequiredRoles::new(["admin"]))
        .oneshot(
            Request::builder()
                .uri("/gated")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_allows_superset_of_required_roles() {
    let token = user_token(&["user", "admin"]);

    let response = app(RequiredRoles::new(["admin"]))
        .oneshot(
            Request::builder()
                .uri("/gated")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn deny_all_rejects_even_privileged_requests() {
    let token = user_token(&["admin"]);

    let response = app(RequiredRoles::none())
        .oneshot(
            Request::builder()
                .uri("/denied")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
