//! Admin/manager endpoints: overview statistics, user management and
//! record administration. Managers see their own department, admins see
//! everything; only admins mutate.

use super::AppState;
use super::auth::{require_admin, require_admin_view};
use crate::db::log::audit;
use crate::db::records::{self, RecordFilter};
use crate::db::{stats, users};
use crate::errors::{AppError, AppResult};
use crate::export::model::RecordExport;
use crate::export::{ExportFormat, csv::records_to_csv_bytes, records_to_xlsx_bytes};
use crate::models::role::Role;
use crate::models::user::UserInfo;
use crate::utils::date::month_bounds_for;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

/// The built-in account that can never be demoted or deleted.
const PROTECTED_USERNAME: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    #[serde(default)]
    pub month: Option<String>,
}

/// GET /api/admin/overview?month=YYYY-MM
pub async fn overview(
    State(state): State<AppState>,
    session: Session,
    Query(q): Query<OverviewQuery>,
) -> AppResult<Json<Value>> {
    let viewer = require_admin_view(&session, &state.db).await?;
    let scope = department_scope(&viewer);

    let (start, end) = month_bounds_for(q.month.as_deref())?;

    let (overview, recent) = state.db.with_conn(|conn| {
        let overview = stats::overview(conn, &start, &end, scope.as_deref())?;
        let recent = records::recent_records(conn, 5, scope.as_deref())?;
        Ok((overview, recent))
    })?;

    Ok(Json(json!({
        "success": true,
        "totalUsers": overview.total_users,
        "todayRecords": overview.today_records,
        "monthRecords": overview.month_records,
        "totalHours": overview.total_hours,
        "departmentStats": overview.department_stats,
        "recentRecords": recent,
    })))
}

/// GET /api/admin/users
pub async fn users(State(state): State<AppState>, session: Session) -> AppResult<Json<Value>> {
    require_admin_view(&session, &state.db).await?;

    let list: Vec<UserInfo> = state
        .db
        .with_conn(|conn| users::list_users(conn))?
        .iter()
        .map(|u| u.to_info())
        .collect();

    Ok(Json(json!({
        "success": true,
        "users": list,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub user_id: i64,
    pub role: String,
}

/// POST /api/admin/update_user_role
pub async fn update_user_role(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&session, &state.db).await?;

    let new_role =
        Role::from_db_str(&req.role).ok_or_else(|| AppError::InvalidRole(req.role.clone()))?;

    state.db.with_conn(|conn| {
        let target = users::find_by_id(conn, req.user_id)?
            .ok_or_else(|| AppError::NotFound("User".into()))?;

        if target.username == PROTECTED_USERNAME {
            return Err(AppError::Validation(
                "The built-in admin account cannot be changed".into(),
            ));
        }

        users::update_role(conn, req.user_id, new_role)?;
        audit(
            conn,
            "role_update",
            &target.username,
            &format!("{} set role to {}", admin.username, new_role.to_db_str()),
        )?;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "User role updated",
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub user_id: i64,
}

/// POST /api/admin/delete_user — cascades to the user's records.
pub async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<DeleteUserRequest>,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&session, &state.db).await?;

    state.db.with_conn(|conn| {
        let target = users::find_by_id(conn, req.user_id)?
            .ok_or_else(|| AppError::NotFound("User".into()))?;

        if target.username == PROTECTED_USERNAME {
            return Err(AppError::Validation(
                "The built-in admin account cannot be deleted".into(),
            ));
        }

        users::delete_user(conn, req.user_id)?;
        audit(
            conn,
            "user_delete",
            &target.username,
            &format!("Deleted by {}", admin.username),
        )?;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "User deleted",
    })))
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

fn build_filter(viewer_scope: Option<String>, q: &RecordsQuery) -> RecordFilter {
    RecordFilter {
        start_date: q.start_date.clone(),
        end_date: q.end_date.clone(),
        user_id: q.user_id,
        // a manager's scope overrides whatever department was asked for
        department: viewer_scope.or_else(|| q.department.clone()),
    }
}

fn department_scope(viewer: &crate::models::user::User) -> Option<String> {
    if viewer.role.sees_all_departments() {
        None
    } else {
        Some(viewer.department.clone())
    }
}

/// GET /api/admin/records?start_date&end_date&user_id&department
pub async fn records(
    State(state): State<AppState>,
    session: Session,
    Query(q): Query<RecordsQuery>,
) -> AppResult<Json<Value>> {
    let viewer = require_admin_view(&session, &state.db).await?;
    let filter = build_filter(department_scope(&viewer), &q);

    let rows = state
        .db
        .with_conn(|conn| records::load_filtered(conn, &filter))?;

    Ok(Json(json!({
        "success": true,
        "records": rows,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecordRequest {
    pub record_id: i64,
}

/// POST /api/admin/delete_record
pub async fn delete_record(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<DeleteRecordRequest>,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&session, &state.db).await?;

    state.db.with_conn(|conn| {
        records::find_owner(conn, req.record_id)?
            .ok_or_else(|| AppError::NotFound("Record".into()))?;

        records::delete_record(conn, req.record_id)?;
        audit(
            conn,
            "record_delete",
            &req.record_id.to_string(),
            &format!("Deleted by {}", admin.username),
        )?;
        Ok(())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Record deleted",
    })))
}

/// GET /api/admin/export?...&format=csv|xlsx — filtered records as a file.
pub async fn export(
    State(state): State<AppState>,
    session: Session,
    Query(q): Query<RecordsQuery>,
) -> AppResult<Response> {
    let viewer = require_admin_view(&session, &state.db).await?;
    let filter = build_filter(department_scope(&viewer), &q);

    let format: ExportFormat = q
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()?;

    let rows: Vec<RecordExport> = state
        .db
        .with_conn(|conn| records::load_filtered(conn, &filter))?
        .iter()
        .map(RecordExport::from_admin_record)
        .collect();

    let bytes = match format {
        ExportFormat::Csv => records_to_csv_bytes(&rows)?,
        ExportFormat::Xlsx => records_to_xlsx_bytes(&rows)?,
    };

    let filename = format!(
        "work_records_{}.{}",
        chrono::Local::now().format("%Y%m%d"),
        format.as_str()
    );

    Response::builder()
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(bytes.into())
        .map_err(|e| AppError::Other(e.to_string()))
}
