//! Manara Content Server Library
//!
//! Subscription-gated educational content platform backend: identity,
//! the entitlement core, the gated content convention, and the admin
//! surface over an embedded document store.

pub mod config;
pub mod constants;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod extractors;
pub mod gated;
pub mod models;
pub mod routes;
pub mod security;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        Self { db, config }
    }
}

/// Build the application router. Layers (CORS, tracing) are added by the
/// binary; tests drive this router directly.
pub fn app(state: AppState) -> Router {
    use routes::admin;

    Router::new()
        .route("/health", get(routes::health_check))
        // Identity
        .route("/api/auth/register", post(routes::register_user))
        .route("/api/auth/login", post(routes::login_user))
        .route(
            "/api/profile",
            get(routes::get_profile).put(routes::update_profile),
        )
        // Catalog
        .route("/api/levels", get(routes::list_levels))
        .route("/api/categories", get(routes::list_categories))
        .route("/api/videos", get(routes::list_videos))
        .route("/api/videos/{id}", get(routes::video_detail))
        .route("/api/videos/{id}/source", get(routes::video_source))
        .route("/api/courses", get(routes::list_courses))
        .route("/api/courses/{id}", get(routes::course_detail))
        .route("/api/courses/{id}/source", get(routes::course_source))
        .route("/api/tests", get(routes::list_tests))
        .route("/api/tests/{id}", get(routes::test_detail))
        .route("/api/tests/{id}/content", get(routes::test_content))
        // Test attempts
        .route("/api/tests/{id}/submit", post(routes::submit_attempt))
        .route("/api/tests/{id}/result", get(routes::my_result))
        // Subscription self-service
        .route("/api/subscription", get(routes::my_subscription))
        // Contact form
        .route("/api/contact", post(routes::submit_message))
        // Management
        .route("/api/admin/stats", get(admin::admin_stats))
        .route("/api/admin/levels", post(admin::create_level))
        .route(
            "/api/admin/levels/{id}",
            put(admin::update_level).delete(admin::delete_level),
        )
        .route("/api/admin/categories", post(admin::create_category))
        .route(
            "/api/admin/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/admin/videos", post(admin::create_video))
        .route(
            "/api/admin/videos/{id}",
            put(admin::update_video).delete(admin::delete_video),
        )
        .route("/api/admin/courses", post(admin::create_course))
        .route(
            "/api/admin/courses/{id}",
            put(admin::update_course).delete(admin::delete_course),
        )
        .route("/api/admin/tests", post(admin::create_test))
        .route(
            "/api/admin/tests/{id}",
            put(admin::update_test).delete(admin::delete_test),
        )
        .route(
            "/api/admin/subscriptions",
            get(admin::list_subscriptions).post(admin::create_subscription),
        )
        .route(
            "/api/admin/subscriptions/{userId}",
            delete(admin::delete_subscription),
        )
        .route(
            "/api/admin/subscriptions/{userId}/renew",
            post(admin::renew_subscription),
        )
        .route("/api/admin/messages", get(admin::list_messages))
        .route(
            "/api/admin/messages/{id}/read",
            put(admin::mark_message_read),
        )
        .with_state(state)
}
