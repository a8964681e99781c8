// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    handlers::{admin, auth, event, health, pages, profile, quiz, submission},
    middleware::audit::audit_middleware,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Unmatched paths get the failure envelope instead of an empty 404.
async fn not_found() -> AppError {
    AppError::NotFound("The requested resource was not found.".to_string())
}

/// Assembles the main application router.
///
/// * `/api/*` calls are audited: one log entry per call, whatever the
///   outcome, unmatched paths included.
/// * Authentication guards matched routes only, so unknown paths are 404.
/// * Pages and `/health` are not audited.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let user_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/token-refresh", post(auth::refresh_token))
        // Protected user routes
        .merge(
            Router::new()
                .route("/user-detail", get(profile::get_user_detail))
                .route("/profile-update", put(profile::update_profile))
                .route("/user-change-password", post(profile::change_password))
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let quiz_routes = Router::new()
        .route("/quiz-list", get(quiz::list_quizzes))
        .route("/start/{quiz_id}", get(quiz::get_quiz).post(quiz::submit_quiz))
        .route("/user-submission-list", get(submission::list_submissions))
        .route("/result/{submission_id}", get(submission::get_result))
        .route("/event-list", get(event::list_events))
        .route("/event-retrieve/{id}", get(event::get_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/quizzes", post(admin::create_quiz))
        .route(
            "/quizzes/{id}",
            put(admin::update_quiz).delete(admin::delete_quiz),
        )
        .route("/quizzes/{id}/questions", post(admin::create_question))
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route("/questions/{id}/answers", post(admin::create_answer))
        .route(
            "/answers/{id}",
            put(admin::update_answer).delete(admin::delete_answer),
        )
        .route("/events", post(admin::create_event))
        .route(
            "/events/{id}",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route("/logs", get(admin::list_logs))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/quiz", quiz_routes)
        .nest("/admin", admin_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), audit_middleware));

    let page_routes = Router::new()
        .route("/quiz/{quiz_id}/start", get(pages::quiz_form).post(pages::submit_form))
        .route("/quiz/result/{submission_id}", get(pages::result_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .route("/health", get(health::health))
        .fallback(not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        AppState {
            pool,
            config: Config {
                database_url: "sqlite::memory:".to_string(),
                jwt_secret: "router_test_secret".to_string(),
                jwt_expiration: 60,
                jwt_refresh_expiration: 120,
                server_address: "127.0.0.1:0".to_string(),
                rust_log: "error".to_string(),
                admin_email: None,
                admin_username: None,
                admin_password: None,
            },
        }
    }

    #[tokio::test]
    async fn rejected_call_without_peer_address_is_still_audited() {
        let state = test_state().await;
        let pool = state.pool.clone();
        let app = create_router(state);

        let req = Request::builder()
            .uri("/api/quiz/event-list")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], 0);

        let (actor, ip, status): (String, Option<String>, String) = sqlx::query_as(
            "SELECT actor, ip_address, status FROM log_entries WHERE api_name = '/api/quiz/event-list'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(actor, "anonymous user");
        assert_eq!(ip, None);
        assert_eq!(status, "401");
    }

    #[tokio::test]
    async fn unknown_paths_are_404_without_credentials() {
        let state = test_state().await;
        let pool = state.pool.clone();
        let app = create_router(state);

        for path in ["/random_path", "/api/nope", "/api/quiz/nope", "/api/admin/nope"] {
            let req = Request::builder().uri(path).body(Body::empty()).unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", path);

            let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["success"], 0, "{}", path);
        }

        let audited: Vec<(String, String)> = sqlx::query_as(
            "SELECT api_name, status FROM log_entries ORDER BY id",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            audited,
            vec![
                ("/api/nope".to_string(), "404".to_string()),
                ("/api/quiz/nope".to_string(), "404".to_string()),
                ("/api/admin/nope".to_string(), "404".to_string()),
            ]
        );
    }
}
