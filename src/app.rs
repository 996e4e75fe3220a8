use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, exchange, games};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(games::router())
                .merge(exchange::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
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

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.bind_addr()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health() {
        let app = build_app(AppState::fake().await);
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_play_and_history_flow() {
        let app = build_app(AppState::fake().await);

        let (status, me) = call(
            &app,
            Method::POST,
            "/api/v1/auth/signup",
            Some(json!({
                "email": "Player@Example.com",
                "username": "player",
                "password": "secret1",
                "country": "Canada"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(me["email"], "player@example.com");
        assert_eq!(me["tokens"], 0);
        assert!(me.get("password_hash").is_none());

        let (status, claim) = call(
            &app,
            Method::POST,
            "/api/v1/games/results",
            Some(json!({ "game_name": "Token Clicker", "score": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(claim["result"]["tokensEarned"], 20);
        assert_eq!(claim["balance"], 20);

        let (status, history) = call(&app, Method::GET, "/api/v1/games/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().map(Vec::len), Some(1));

        let (_, me) = call(&app, Method::GET, "/api/v1/me", None).await;
        assert_eq!(me["tokens"], 20);
    }

    #[tokio::test]
    async fn duplicate_signup_is_conflict() {
        let app = build_app(AppState::fake().await);
        let body = json!({ "email": "a@example.com", "username": "alpha", "password": "secret1" });
        let (first, _) = call(&app, Method::POST, "/api/v1/auth/signup", Some(body)).await;
        assert_eq!(first, StatusCode::CREATED);

        let again = json!({ "email": "A@EXAMPLE.COM", "username": "beta", "password": "secret1" });
        let (status, err) = call(&app, Method::POST, "/api/v1/auth/signup", Some(again)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"], "Email already exists");
    }

    #[tokio::test]
    async fn logout_then_me_is_unauthorized() {
        let app = build_app(AppState::fake().await);
        let body = json!({ "email": "a@example.com", "username": "alpha", "password": "secret1" });
        call(&app, Method::POST, "/api/v1/auth/signup", Some(body)).await;

        let (status, _) = call(&app, Method::POST, "/api/v1/auth/logout", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::POST, "/api/v1/auth/logout", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, Method::GET, "/api/v1/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, user) = call(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({ "identifier": "ALPHA", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["username"], "alpha");
    }

    #[tokio::test]
    async fn profile_patch_and_forgot_password() {
        let app = build_app(AppState::fake().await);
        let body = json!({ "email": "a@example.com", "username": "alpha", "password": "secret1" });
        call(&app, Method::POST, "/api/v1/auth/signup", Some(body)).await;

        let (status, me) = call(
            &app,
            Method::PATCH,
            "/api/v1/me",
            Some(json!({ "profession": "Teacher" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["profession"], "Teacher");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/auth/forgot-password",
            Some(json!({ "email": "a@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/auth/forgot-password",
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exchange_quote_route() {
        let app = build_app(AppState::fake().await);
        let (status, q) = call(
            &app,
            Method::GET,
            "/api/v1/exchange/quote?from=BTC&to=ETH&amount=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(q["received"], 40.0);

        let (status, _) = call(&app, Method::GET, "/api/v1/games", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
