//! Timesheet CRUD, CSV export, monthly defaults and per-user statistics.

use super::AppState;
use super::auth::{require_user, require_admin_view};
use crate::core::hours::{compute_totals, safe_float, safe_int, safe_str};
use crate::db::{defaults, records, stats};
use crate::errors::{AppError, AppResult};
use crate::export::csv::records_to_csv_bytes;
use crate::export::model::RecordExport;
use crate::models::monthly_default::MonthlyDefaults;
use crate::models::record::TimesheetRecord;
use crate::models::transport::TransportMode;
use crate::utils::date;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use chrono::Datelike;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

/// GET /api/timesheet — the caller's own records.
pub async fn list_my(State(state): State<AppState>, session: Session) -> AppResult<Json<Value>> {
    let user = require_user(&session, &state.db).await?;

    let records = state
        .db
        .with_conn(|conn| records::load_for_user(conn, user.id))?;

    Ok(Json(json!({
        "success": true,
        "records": records,
    })))
}

/// POST /api/timesheet — create a record. The entry form posts loose JSON
/// (numbers as strings, missing keys), so the body is picked apart with the
/// tolerant helpers instead of a strict shape.
pub async fn create_my(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let user = require_user(&session, &state.db).await?;

    let work_date = safe_str(body.get("workDate"));
    if date::parse_date(&work_date).is_none() {
        return Err(AppError::InvalidDate(work_date));
    }

    let mode_str = {
        let s = safe_str(body.get("transportMode"));
        if s.is_empty() { "driving".to_string() } else { s }
    };
    let mode = TransportMode::from_db_str(&mode_str)
        .ok_or_else(|| AppError::InvalidTransportMode(mode_str.clone()))?;

    let totals = compute_totals(
        mode,
        safe_float(body.get("travelHours"), 0.0),
        safe_float(body.get("visitHours"), 0.0),
        safe_float(body.get("reportHours"), 0.0),
    );

    let record = TimesheetRecord {
        id: 0,
        user_id: user.id,
        work_date,
        business_trip_days: safe_int(body.get("businessTripDays"), 1),
        actual_visit_days: safe_int(body.get("actualVisitDays"), 1),
        audit_store_count: 1,
        training_store_count: 0,
        start_location: safe_str(body.get("startStore")),
        end_location: safe_str(body.get("endStore")),
        round_trip_distance: safe_float(body.get("roundTripDistance"), 0.0),
        transport_mode: mode.to_db_str().to_string(),
        schedule_number: safe_str(body.get("scheduleNumber")),
        travel_hours: totals.travel_hours,
        visit_hours: totals.visit_hours,
        report_hours: totals.report_hours,
        total_work_hours: totals.total_work_hours,
        notes: safe_str(body.get("notes")),
        store_code: safe_str(body.get("storeCode")),
        city: safe_str(body.get("city")),
        created_at: String::new(),
    };

    state.db.with_conn(|conn| records::insert_record(conn, &record))?;

    Ok(Json(json!({
        "success": true,
        "message": "Timesheet record saved",
    })))
}

/// DELETE /api/timesheet/{id} — owner-only delete.
pub async fn delete_my(
    State(state): State<AppState>,
    session: Session,
    Path(record_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let user = require_user(&session, &state.db).await?;

    state.db.with_conn(|conn| {
        let owner = records::find_owner(conn, record_id)?
            .ok_or_else(|| AppError::NotFound("Record".into()))?;

        if owner != user.id {
            return Err(AppError::Forbidden);
        }

        records::delete_record(conn, record_id)?;
        crate::db::log::audit(
            conn,
            "record_delete",
            &record_id.to_string(),
            &format!("Deleted by owner {}", user.username),
        )?;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Record deleted",
    })))
}

/// GET /api/timesheet/export — own records as a CSV download, date ascending.
pub async fn export_my(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let user = require_user(&session, &state.db).await?;

    let rows: Vec<RecordExport> = state
        .db
        .with_conn(|conn| records::load_for_user(conn, user.id))?
        .iter()
        .map(RecordExport::from_own_record)
        .collect();

    let bytes = records_to_csv_bytes(&rows)?;
    let filename = format!(
        "timesheet_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(bytes.into())
        .map_err(|e| AppError::Other(e.to_string()))
}

/// GET /api/monthly_defaults — the caller's defaults for the current month.
pub async fn get_monthly_defaults(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Value>> {
    let user = require_user(&session, &state.db).await?;

    let today = date::today();
    let defaults = state
        .db
        .with_conn(|conn| defaults::load_defaults(conn, user.id, today.year(), today.month()))?;

    Ok(Json(json!({
        "success": true,
        "defaults": defaults,
    })))
}

/// POST /api/monthly_defaults — upsert the current month's defaults.
pub async fn save_monthly_defaults(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    let user = require_user(&session, &state.db).await?;

    let new_defaults = MonthlyDefaults {
        business_trip_days: safe_int(body.get("business_trip_days"), 1),
        actual_visit_days: safe_int(body.get("actual_visit_days"), 1),
    };

    let today = date::today();
    state.db.with_conn(|conn| {
        defaults::save_defaults(conn, user.id, today.year(), today.month(), new_defaults)
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Monthly defaults saved",
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub month: Option<String>,
}

/// GET /api/statistics/{user_id}?month=YYYY-MM — monthly aggregates for a
/// user. Accessible to the user themselves, their manager, and admins.
pub async fn statistics(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<i64>,
    Query(q): Query<StatsQuery>,
) -> AppResult<Json<Value>> {
    let caller = require_user(&session, &state.db).await?;

    if caller.id != user_id {
        let viewer = require_admin_view(&session, &state.db).await?;
        if !viewer.role.sees_all_departments() {
            let target = state
                .db
                .with_conn(|conn| crate::db::users::find_by_id(conn, user_id))?
                .ok_or_else(|| AppError::NotFound("User".into()))?;
            if target.department != viewer.department {
                return Err(AppError::Forbidden);
            }
        }
    }

    let month = q.month.clone();
    let (start, end) = date::month_bounds_for(month.as_deref())?;

    let stats = state
        .db
        .with_conn(|conn| stats::user_month_stats(conn, user_id, &start, &end))?;

    Ok(Json(json!({
        "success": true,
        "user_id": user_id,
        "month": month,
        "stats": stats,
    })))
}
