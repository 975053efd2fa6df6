use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, companies, jobs, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(companies::router())
        .merge(jobs::router())
        .merge(users::router())
        .route("/health", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::authenticate,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3001".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Router-level checks that finish before any query runs, so the lazy
/// pool in `AppState::fake` is never touched.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{
        body::{to_bytes, Body},
        extract::FromRef,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn token_for(state: &AppState, username: &str, is_admin: bool) -> String {
        JwtKeys::from_ref(state).sign(username, is_admin).unwrap()
    }

    fn request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let app = build_app(AppState::fake());
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn new_job() -> Value {
        json!({ "title": "New Jobby", "salary": 115000, "equity": 0.15, "companyHandle": "c2" })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_job_anon_is_unauthorized() {
        let (status, body) = send(request(Method::POST, "/jobs", None, Some(new_job()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["status"], 401);
    }

    #[tokio::test]
    async fn create_job_non_admin_is_unauthorized() {
        let state = AppState::fake();
        let token = token_for(&state, "u1", false);
        let (status, _) = send(request(Method::POST, "/jobs", Some(&token), Some(new_job()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_with_wrong_secret_is_treated_as_anonymous() {
        let forged = JwtKeys::from(&crate::config::JwtConfig {
            secret: "wrong".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
        })
        .sign("admin", true)
        .unwrap();
        let (status, _) = send(request(Method::DELETE, "/jobs/1", Some(&forged), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_job_admin_missing_data_is_bad_request() {
        let state = AppState::fake();
        let token = token_for(&state, "admin", true);
        let body = json!({ "title": "New Jobby", "salary": 115000 });
        let (status, body) = send(request(Method::POST, "/jobs", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], 400);
    }

    #[tokio::test]
    async fn create_job_admin_invalid_data_lists_each_violation() {
        let state = AppState::fake();
        let token = token_for(&state, "admin", true);
        let mut job = new_job();
        job["salary"] = json!(-100);
        job["equity"] = json!(2.0);
        let (status, body) = send(request(Method::POST, "/jobs", Some(&token), Some(job))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errors"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn patch_job_cannot_change_id() {
        let state = AppState::fake();
        let token = token_for(&state, "admin", true);
        let body = json!({ "id": 5 });
        let (status, _) = send(request(Method::PATCH, "/jobs/1", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_job_validates_company_handle() {
        let state = AppState::fake();
        let token = token_for(&state, "admin", true);
        let body = json!({ "companyHandle": "" });
        let (status, body) =
            send(request(Method::PATCH, "/jobs/1", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errors"][0], "companyHandle must be 1 to 25 characters");
    }

    #[tokio::test]
    async fn non_numeric_job_id_is_bad_request() {
        let (status, body) = send(request(Method::GET, "/jobs/abc", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], 400);

        let state = AppState::fake();
        let token = token_for(&state, "admin", true);
        let (status, body) =
            send(request(Method::DELETE, "/jobs/abc", Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], 400);

        let token = token_for(&state, "u1", false);
        let (status, body) =
            send(request(Method::POST, "/users/u1/jobs/abc", Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], 400);
    }

    #[tokio::test]
    async fn list_companies_rejects_inverted_bounds() {
        let (status, body) = send(request(
            Method::GET,
            "/companies?minEmployees=100&maxEmployees=50",
            None,
            None,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "minEmployees cannot be greater than maxEmployees"
        );
    }

    #[tokio::test]
    async fn list_jobs_rejects_non_numeric_salary() {
        let (status, _) = send(request(Method::GET, "/jobs?minSalary=lots", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn user_routes_reject_other_non_admin_user() {
        let state = AppState::fake();
        let token = token_for(&state, "u2", false);
        let (status, _) = send(request(Method::GET, "/users/u1", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(request(Method::DELETE, "/users/u1", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            send(request(Method::POST, "/users/u1/jobs/1", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_users_requires_admin() {
        let state = AppState::fake();
        let token = token_for(&state, "u1", false);
        let (status, _) = send(request(Method::GET, "/users", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn same_user_patch_validates_before_database() {
        let state = AppState::fake();
        let token = token_for(&state, "u1", false);
        let body = json!({ "email": "not-an-email" });
        let (status, _) =
            send(request(Method::PATCH, "/users/u1", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn me_requires_login() {
        let (status, _) = send(request(Method::GET, "/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
