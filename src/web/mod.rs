//! HTTP surface: axum router, shared state and the JSON handlers.

pub mod admin;
pub mod auth;
pub mod geo_routes;
pub mod stores;
pub mod timesheet;

use crate::config::Config;
use crate::db::pool::DbPool;
use crate::geo::GeoService;
use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub cfg: Arc<Config>,
    pub geo: Arc<GeoService>,
}

impl AppState {
    pub fn new(db: DbPool, cfg: Config) -> Self {
        let geo = Arc::new(GeoService::new(&cfg));
        Self {
            db,
            cfg: Arc::new(cfg),
            geo,
        }
    }
}

/// Build the full application router. Sessions live in an in-process store;
/// the cookie only carries the session id.
pub fn router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    Router::new()
        .route("/health", get(health))
        // auth
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/me", get(auth::me))
        // timesheet
        .route(
            "/api/timesheet",
            get(timesheet::list_my).post(timesheet::create_my),
        )
        .route("/api/timesheet/{id}", axum::routing::delete(timesheet::delete_my))
        .route("/api/timesheet/export", get(timesheet::export_my))
        .route(
            "/api/monthly_defaults",
            get(timesheet::get_monthly_defaults).post(timesheet::save_monthly_defaults),
        )
        .route("/api/statistics/{user_id}", get(timesheet::statistics))
        // stores
        .route("/api/stores", get(stores::list))
        .route("/api/stores/by-code/{code}", get(stores::by_code))
        .route("/api/stores/import", post(stores::import))
        .route("/api/stores/export", get(stores::export))
        // geo
        .route("/api/search_location", post(geo_routes::search_location))
        .route("/api/calculate_route", post(geo_routes::calculate_route))
        .route("/api/provider_usage", get(geo_routes::provider_usage))
        // admin
        .route("/api/admin/overview", get(admin::overview))
        .route("/api/admin/users", get(admin::users))
        .route("/api/admin/update_user_role", post(admin::update_user_role))
        .route("/api/admin/delete_user", post(admin::delete_user))
        .route("/api/admin/records", get(admin::records))
        .route("/api/admin/delete_record", post(admin::delete_record))
        .route("/api/admin/export", get(admin::export))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}
