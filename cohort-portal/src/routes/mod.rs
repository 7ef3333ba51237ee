//! Router assembly

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth, handlers, state::AppState};

/// Build the application router
///
/// All `/admin` routes require an admin Bearer token (enforced by the
/// `AdminClaims` extractor inside each handler).
pub fn router(state: AppState) -> Router {
    let uploads = &state.config().uploads;
    // Multipart limit: every attachment plus a little room for the
    // text fields.
    #[allow(clippy::cast_possible_truncation)]
    let body_limit =
        (uploads.max_file_bytes as usize) * uploads.max_files + 1024 * 1024;
    let request_timeout = Duration::from_secs(state.config().service.request_timeout_secs);

    let auth_routes = Router::new()
        .route("/admin/login", post(auth::handlers::login))
        .route("/refresh", post(auth::handlers::refresh))
        .route("/logout", post(auth::handlers::logout))
        .route("/verify", get(auth::handlers::verify));

    let admin_routes = Router::new()
        .route("/users", get(handlers::users::list_users))
        .route("/users/add-interns", post(handlers::users::add_interns))
        .route(
            "/users/{id}/status",
            patch(handlers::users::update_user_status),
        )
        .route("/users/{id}", delete(handlers::users::delete_user))
        .route(
            "/units",
            get(handlers::units::list_units).post(handlers::units::create_unit),
        )
        .route(
            "/units/{id}",
            get(handlers::units::get_unit)
                .patch(handlers::units::update_unit)
                .delete(handlers::units::delete_unit),
        )
        .route(
            "/campaign/recipients",
            get(handlers::campaign::recipients),
        )
        .route("/campaign/preview", post(handlers::campaign::preview))
        .route("/campaign/send", post(handlers::campaign::send));

    Router::new()
        .route("/", get(root))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Cohort Portal API is running",
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        auth::TokenService,
        config::AppConfig,
        models::{user::ROLE_ADMIN, User},
        testing::MockEmailSender,
    };

    use super::*;

    const TEST_SECRET: &str = "router-test-secret";

    // A lazily-connecting pool lets these tests cover routing and
    // auth without a live database; none of them reach a query.
    fn test_state_with_mailer(mailer: MockEmailSender) -> AppState {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = TEST_SECRET.to_string();

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/cohort_portal_test")
            .expect("lazy pool");

        AppState::new(config, pool, Arc::new(mailer)).expect("state")
    }

    fn test_state() -> AppState {
        test_state_with_mailer(MockEmailSender::new())
    }

    fn admin_token() -> String {
        let service = TokenService::from_settings(&{
            let mut settings = crate::config::AuthSettings::default();
            settings.jwt_secret = TEST_SECRET.to_string();
            settings
        })
        .expect("token service");

        let user = User {
            id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: None,
            role: ROLE_ADMIN.to_string(),
            unit_id: None,
            is_approved: true,
            rejection_reason: None,
            refresh_token: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        service.issue_pair(&user).expect("issue").access_token
    }

    #[tokio::test]
    async fn root_reports_running() {
        let app = router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/units")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbled_bearer_token_is_rejected() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/verify")
                    .header("Authorization", "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_admin_token_passes_verify() {
        let app = router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/verify")
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn campaign_preview_without_recipients_is_bad_request() {
        let mailer = MockEmailSender::new();
        let app = router(test_state_with_mailer(mailer.clone()));

        let body = "--boundary\r\n\
                    Content-Disposition: form-data; name=\"subject\"\r\n\r\n\
                    Hello\r\n\
                    --boundary--\r\n";

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/campaign/preview")
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .header(
                        "Content-Type",
                        "multipart/form-data; boundary=boundary",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(mailer.sent_count(), 0);
    }
}
