//! Store catalog endpoints: list/search, lookup by code, bulk import and
//! CSV export.

use super::AppState;
use super::auth::{require_admin, require_admin_view, require_user};
use crate::db::stores;
use crate::errors::{AppError, AppResult};
use crate::import::import_stores;
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::Response;
use csv::Writer;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    #[serde(default)]
    pub search: String,
}

fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    50
}

/// GET /api/stores?page&per_page&search
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(q): Query<StoreListQuery>,
) -> AppResult<Json<Value>> {
    require_user(&session, &state.db).await?;

    let per_page = q.per_page.clamp(1, 200);
    let (rows, total) = state
        .db
        .with_conn(|conn| stores::search_stores(conn, q.search.trim(), q.page, per_page))?;

    Ok(Json(json!({
        "success": true,
        "stores": rows,
        "pagination": {
            "page": q.page.max(1),
            "per_page": per_page,
            "total": total,
            "pages": (total + per_page - 1) / per_page,
        },
    })))
}

/// GET /api/stores/by-code/{code}
pub async fn by_code(
    State(state): State<AppState>,
    session: Session,
    Path(code): Path<String>,
) -> AppResult<Json<Value>> {
    require_user(&session, &state.db).await?;

    let store = state
        .db
        .with_conn(|conn| stores::find_by_code(conn, code.trim()))?
        .ok_or_else(|| AppError::NotFound("Store code".into()))?;

    Ok(Json(json!({
        "success": true,
        "store": store,
    })))
}

/// POST /api/stores/import — multipart spreadsheet upload, admin only.
pub async fn import(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&session, &state.db).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Bad upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("No file selected".into()))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Bad upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| AppError::Validation("No file selected".into()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }

    tracing::info!(admin = %admin.username, file = %filename, "store import started");

    let report = state
        .db
        .with_conn(|conn| import_stores(conn, &filename, &bytes))?;

    Ok(Json(json!({
        "success": true,
        "message": report.summary(),
        "report": report,
    })))
}

/// GET /api/stores/export — the catalog as CSV, for managers and admins.
pub async fn export(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    require_admin_view(&session, &state.db).await?;

    let all = state.db.with_conn(|conn| stores::load_all(conn))?;

    let mut out: Vec<u8> = Vec::from(&b"\xef\xbb\xbf"[..]);
    {
        let mut wtr = Writer::from_writer(&mut out);
        wtr.write_record([
            "store_code",
            "store_name",
            "store_city",
            "longitude",
            "latitude",
            "address",
        ])
        .map_err(|e| AppError::Export(e.to_string()))?;

        for s in &all {
            wtr.write_record([
                s.store_code.clone(),
                s.store_name.clone(),
                s.store_city.clone(),
                s.longitude.map(|v| v.to_string()).unwrap_or_default(),
                s.latitude.map(|v| v.to_string()).unwrap_or_default(),
                s.address.clone(),
            ])
            .map_err(|e| AppError::Export(e.to_string()))?;
        }
        wtr.flush()?;
    }

    let filename = format!("stores_{}.csv", chrono::Local::now().format("%Y%m%d"));

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(out.into())
        .map_err(|e| AppError::Other(e.to_string()))
}
