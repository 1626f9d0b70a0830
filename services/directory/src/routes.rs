//! Directory service routes

use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Serialize;
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{middleware::auth_guard, state::AppState};

pub mod admin;
pub mod auth;
pub mod employees;
pub mod geocode;

/// Photos travel inside JSON bodies as data URIs
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Response for simple acknowledgements
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Response for mutations, carrying the matched row count
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub message: String,
    #[serde(rename = "affectedRows")]
    pub affected_rows: u64,
}

impl MutationResponse {
    pub fn new(message: impl Into<String>, affected_rows: u64) -> Json<Self> {
        Json(Self {
            message: message.into(),
            affected_rows,
        })
    }
}

/// Create the router for the directory service.
///
/// JSON routes live under `/api`; when `assets` is given, every other path is
/// served from that directory. The authorization guard covers both.
pub fn create_router(state: AppState, assets: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route(
            "/employees",
            get(employees::list_active).post(employees::create),
        )
        .route("/employees/archived", get(employees::list_archived))
        .route("/add", post(employees::create))
        .route("/edit/:id", put(employees::update))
        .route("/delete/:id", delete(employees::delete))
        .route("/archive/:id", put(employees::archive))
        .route("/unarchive/:id", put(employees::unarchive))
        .route("/geocode", get(geocode::search))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/admin/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        );

    let mut router = Router::new().nest("/api", api);
    if let Some(dir) = assets {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.employees.health_check().await.unwrap_or(false);

    Json(json!({
        "status": if storage { "ok" } else { "degraded" },
        "service": "directory",
        "storage": storage,
    }))
}
