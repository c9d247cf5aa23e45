//! HTTP handlers.
//!
//! All responses are JSON. Handlers read the authentication context the
//! middleware published; none of them require it. The role gate on the
//! route table decides what is protected.

use crate::errors::ApiError;
use crate::models;
use authn::AuthContext;
use axum::{
    extract::Path,
    response::Redirect,
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

/// Response for the `/health` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"; the service has no downstream dependencies to probe.
    pub status: String,
}

/// Handler for `GET /health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Handler for `GET /`.
///
/// Lists every article; when the request carried a verified identity
/// token, its claims ride along under `user`.
#[instrument(skip_all, name = "articles.index")]
pub async fn index(Extension(context): Extension<AuthContext>) -> Json<serde_json::Value> {
    let mut body = json!({
        "title": "Home Page",
        "payload": models::all_articles(),
    });

    if let Some(token) = &context.id_token {
        body["user"] = serde_json::to_value(&token.claims).unwrap_or(serde_json::Value::Null);
    }

    Json(body)
}

/// Handler for `GET /article/view/:article_id`.
///
/// A non-numeric id is indistinguishable from an unknown one: both are 404.
#[instrument(skip_all, name = "articles.view", fields(article_id = %article_id))]
pub async fn get_article(
    Path(article_id): Path<String>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id: u32 = article_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("No article with id {article_id}")))?;

    let article = models::article_by_id(id)
        .ok_or_else(|| ApiError::NotFound(format!("No article with id {id}")))?;

    let mut body = json!({
        "title": article.title,
        "payload": article,
    });

    if let Some(token) = &context.id_token {
        body["user"] = serde_json::to_value(&token.claims).unwrap_or(serde_json::Value::Null);
    }

    Ok(Json(body))
}

/// Handler for `GET|POST /v1/me`.
///
/// Echoes the authenticated identity. The route is gated on the `openid`
/// role, so the context always carries an access token here.
#[instrument(skip_all, name = "articles.me")]
pub async fn me(Extension(context): Extension<AuthContext>) -> Json<serde_json::Value> {
    Json(json!({
        "subject": context.subject,
        "roles": context.roles,
        "claims": context.access_token.as_ref().map(|token| &token.claims),
    }))
}

/// Handler for `GET /login`.
pub async fn login() -> Redirect {
    Redirect::temporary("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_healthy() {
        let Json(response) = health().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn index_without_identity_has_no_user() {
        let Json(body) = index(Extension(AuthContext::default())).await;

        assert_eq!(body["title"], "Home Page");
        assert_eq!(body["payload"].as_array().unwrap().len(), 2);
        assert!(body.get("user").is_none());
    }

    #[tokio::test]
    async fn get_article_rejects_non_numeric_id() {
        let result = get_article(
            Path("abc".to_string()),
            Extension(AuthContext::default()),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_article_rejects_unknown_id() {
        let result = get_article(Path("9".to_string()), Extension(AuthContext::default())).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_article_returns_known_article() {
        let result = get_article(Path("1".to_string()), Extension(AuthContext::default()))
            .await
            .unwrap();

        assert_eq!(result.0["title"], "Article 1");
        assert_eq!(result.0["payload"]["id"], 1);
    }

    #[tokio::test]
    async fn me_echoes_empty_context() {
        let Json(body) = me(Extension(AuthContext::default())).await;

        assert_eq!(body["subject"], serde_json::Value::Null);
        assert_eq!(body["roles"], serde_json::Value::Null);
        assert_eq!(body["claims"], serde_json::Value::Null);
    }
}
