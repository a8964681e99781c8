// src/middleware/audit.rs

use std::net::SocketAddr;

use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, OriginalUri, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    config::ANONYMOUS_ACTOR,
    error::AppError,
    models::log_entry::NewLogEntry,
    services::audit,
    state::AppState,
    utils::jwt::{TOKEN_ACCESS, token_from_headers, verify_jwt_of},
};

/// Axum Middleware: Request audit.
///
/// Runs the request, then writes exactly one log entry describing it,
/// whatever the outcome. The caller identity and request metadata are
/// collected here and passed explicitly to [`audit::record`]. Request bodies
/// are not captured.
///
/// A response body that fails mid-stream cannot be forwarded intact, so it
/// is replaced by a 500 envelope and audited as such.
pub async fn audit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let actor = token_from_headers(req.headers())
        .and_then(|token| verify_jwt_of(token, &state.config.jwt_secret, TOKEN_ACCESS).ok())
        .map(|claims| claims.username)
        .unwrap_or_else(|| ANONYMOUS_ACTOR.to_string());

    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.clone())
        .unwrap_or_else(|| req.uri().clone());

    let ip_address = client_ip(req.headers(), req.extensions().get::<ConnectInfo<SocketAddr>>());
    let api_type = req.method().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    let (parts, bytes) = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => (parts, bytes),
        Err(e) => {
            tracing::error!("Response body for {} failed mid-stream: {:?}", uri.path(), e);
            let (parts, body) =
                AppError::InternalServerError(e.to_string()).into_response().into_parts();
            let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
            (parts, bytes)
        }
    };

    let entry = NewLogEntry {
        actor,
        ip_address,
        message: audit::outcome_message(&bytes, parts.status),
        api_name: uri.path().to_string(),
        api_type,
        send_data: audit::payload_snapshot(&bytes),
        get_data: audit::query_snapshot(&uri),
        status: parts.status.as_u16(),
    };

    audit::record(&state.pool, entry).await;

    Response::from_parts(parts, Body::from(bytes))
}

/// First `X-Forwarded-For` hop when behind a proxy, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    match forwarded {
        Some(hop) => Some(hop.to_string()),
        None => peer.map(|ConnectInfo(addr)| addr.ip().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{Router, http::HeaderValue, http::StatusCode, middleware, routing::get};
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    async fn broken_body() -> Response {
        let chunks = vec![
            Ok(axum::body::Bytes::from_static(b"{\"success\":1")),
            Err(std::io::Error::other("connection reset")),
        ];
        Response::new(Body::from_stream(futures_util::stream::iter(chunks)))
    }

    #[tokio::test]
    async fn failing_body_becomes_audited_server_error() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let state = AppState {
            pool: pool.clone(),
            config: Config {
                database_url: "sqlite::memory:".to_string(),
                jwt_secret: "audit_test_secret".to_string(),
                jwt_expiration: 60,
                jwt_refresh_expiration: 120,
                server_address: "127.0.0.1:0".to_string(),
                rust_log: "error".to_string(),
                admin_email: None,
                admin_username: None,
                admin_password: None,
            },
        };

        let app = Router::new()
            .route("/api/stream", get(broken_body))
            .layer(middleware::from_fn_with_state(state.clone(), audit_middleware))
            .with_state(state);

        let req = Request::builder().uri("/api/stream").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], 0);

        let status: String =
            sqlx::query_scalar("SELECT status FROM log_entries WHERE api_name = '/api/stream'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "500");
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        let peer = ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000)));

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("10.0.0.1"));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("203.0.113.7"));

        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
