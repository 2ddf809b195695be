//! Location search, route calculation and provider-usage endpoints.

use super::AppState;
use super::auth::require_user;
use crate::errors::AppResult;
use crate::geo::RouteRequest;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// POST /api/search_location
pub async fn search_location(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SearchRequest>,
) -> AppResult<Json<Value>> {
    require_user(&session, &state.db).await?;

    let locations = state
        .geo
        .search_location(&req.keyword, req.city.as_deref())
        .await?;

    if locations.is_empty() {
        return Ok(Json(json!({
            "success": false,
            "message": format!(
                "No places found for \"{}\", try a different keyword",
                req.keyword.trim()
            ),
        })));
    }

    Ok(Json(json!({
        "success": true,
        "locations": locations,
    })))
}

/// POST /api/calculate_route — one-way distance/time between two stores.
/// Endpoints named by a known store code resolve against the catalog first,
/// saving a provider round trip.
pub async fn calculate_route(
    State(state): State<AppState>,
    session: Session,
    Json(mut req): Json<RouteRequest>,
) -> AppResult<Json<Value>> {
    require_user(&session, &state.db).await?;

    if req.start_location.as_deref().unwrap_or("").is_empty() {
        req.start_location = catalog_coords(&state, &req.start_store)?;
    }
    if req.end_location.as_deref().unwrap_or("").is_empty() {
        req.end_location = catalog_coords(&state, &req.end_store)?;
    }

    let quote = state.geo.calculate_route(&req).await?;

    Ok(Json(json!({
        "success": true,
        "distance": quote.distance,
        "duration": quote.duration,
        "traffic_lights": quote.traffic_lights,
        "tolls": quote.tolls,
        "toll_distance": quote.toll_distance,
        "api_used": quote.api_used,
    })))
}

/// Coordinates from the store catalog, when the given name is a known store
/// code with geocoded coordinates.
fn catalog_coords(state: &AppState, store: &str) -> crate::errors::AppResult<Option<String>> {
    let store = store.trim();
    if store.is_empty() {
        return Ok(None);
    }
    state.db.with_conn(|conn| {
        Ok(crate::db::stores::find_by_code(conn, store)?.and_then(|s| s.coord_string()))
    })
}

/// GET /api/provider_usage — secondary-provider budget statistics.
pub async fn provider_usage(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    require_user(&session, &state.db).await?;

    let stats = state.geo.usage_stats()?;

    Ok(Json(json!({
        "success": true,
        "today_usage": stats.today_usage,
        "daily_limit": stats.daily_limit,
        "remaining": stats.remaining,
        "cache_size": stats.cache_size,
        "cache_limit": stats.cache_limit,
        "usage_percentage": stats.usage_percentage,
        "date": stats.date,
    })))
}
