use crate::errors::AppResult;
use crate::models::record::{RecordWithUser, TimesheetRecord};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<TimesheetRecord> {
    Ok(TimesheetRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        work_date: row.get("work_date")?,
        business_trip_days: row.get("business_trip_days")?,
        actual_visit_days: row.get("actual_visit_days")?,
        audit_store_count: row.get("audit_store_count")?,
        training_store_count: row.get("training_store_count")?,
        start_location: row.get::<_, Option<String>>("start_location")?.unwrap_or_default(),
        end_location: row.get::<_, Option<String>>("end_location")?.unwrap_or_default(),
        round_trip_distance: row.get("round_trip_distance")?,
        transport_mode: row.get("transport_mode")?,
        schedule_number: row.get::<_, Option<String>>("schedule_number")?.unwrap_or_default(),
        travel_hours: row.get("travel_hours")?,
        visit_hours: row.get("visit_hours")?,
        report_hours: row.get("report_hours")?,
        total_work_hours: row.get("total_work_hours")?,
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
        store_code: row.get::<_, Option<String>>("store_code")?.unwrap_or_default(),
        city: row.get::<_, Option<String>>("city")?.unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

fn map_row_with_user(row: &Row) -> Result<RecordWithUser> {
    Ok(RecordWithUser {
        record: map_row(row)?,
        user_name: row.get("user_name")?,
        user_department: row
            .get::<_, Option<String>>("user_department")?
            .unwrap_or_default(),
    })
}

pub fn insert_record(conn: &Connection, rec: &TimesheetRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO timesheet_records (
            user_id, work_date, business_trip_days, actual_visit_days,
            audit_store_count, training_store_count, start_location, end_location,
            round_trip_distance, transport_mode, schedule_number,
            travel_hours, visit_hours, report_hours, total_work_hours,
            notes, store_code, city
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            rec.user_id,
            rec.work_date,
            rec.business_trip_days,
            rec.actual_visit_days,
            rec.audit_store_count,
            rec.training_store_count,
            rec.start_location,
            rec.end_location,
            rec.round_trip_distance,
            rec.transport_mode,
            rec.schedule_number,
            rec.travel_hours,
            rec.visit_hours,
            rec.report_hours,
            rec.total_work_hours,
            rec.notes,
            rec.store_code,
            rec.city,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// A user's own records, oldest work day first (the entry form shows the
/// month top-down).
pub fn load_for_user(conn: &Connection, user_id: i64) -> AppResult<Vec<TimesheetRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM timesheet_records
         WHERE user_id = ?1
         ORDER BY work_date ASC, created_at ASC",
    )?;

    let rows = stmt.query_map([user_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_owner(conn: &Connection, record_id: i64) -> AppResult<Option<i64>> {
    let owner: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM timesheet_records WHERE id = ?1",
            [record_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner)
}

pub fn delete_record(conn: &Connection, record_id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM timesheet_records WHERE id = ?1", [record_id])?;
    Ok(())
}

/// Admin record filter. Empty fields are skipped when building the query.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<i64>,
    pub department: Option<String>,
}

/// Filtered records joined with their owners, newest work day first.
pub fn load_filtered(conn: &Connection, filter: &RecordFilter) -> AppResult<Vec<RecordWithUser>> {
    let mut sql = String::from(
        "SELECT t.*, u.name AS user_name, u.department AS user_department
         FROM timesheet_records t
         JOIN users u ON t.user_id = u.id
         WHERE 1=1",
    );
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(start) = &filter.start_date
        && !start.is_empty()
    {
        sql.push_str(&format!(" AND t.work_date >= ?{}", args.len() + 1));
        args.push(Box::new(start.clone()));
    }
    if let Some(end) = &filter.end_date
        && !end.is_empty()
    {
        sql.push_str(&format!(" AND t.work_date <= ?{}", args.len() + 1));
        args.push(Box::new(end.clone()));
    }
    if let Some(user_id) = filter.user_id {
        sql.push_str(&format!(" AND t.user_id = ?{}", args.len() + 1));
        args.push(Box::new(user_id));
    }
    if let Some(dept) = &filter.department
        && !dept.is_empty()
    {
        sql.push_str(&format!(" AND u.department = ?{}", args.len() + 1));
        args.push(Box::new(dept.clone()));
    }

    sql.push_str(" ORDER BY t.work_date DESC, t.created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params), map_row_with_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Most recently created records, for the admin overview panel. Managers
/// pass their department and only see their own group's submissions.
pub fn recent_records(
    conn: &Connection,
    limit: i64,
    department: Option<&str>,
) -> AppResult<Vec<RecordWithUser>> {
    let mut out = Vec::new();

    match department {
        Some(dept) => {
            let mut stmt = conn.prepare(
                "SELECT t.*, u.name AS user_name, u.department AS user_department
                 FROM timesheet_records t
                 JOIN users u ON t.user_id = u.id
                 WHERE u.department = ?1
                 ORDER BY t.created_at DESC, t.id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![dept, limit], map_row_with_user)?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT t.*, u.name AS user_name, u.department AS user_department
                 FROM timesheet_records t
                 JOIN users u ON t.user_id = u.id
                 ORDER BY t.created_at DESC, t.id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], map_row_with_user)?;
            for r in rows {
                out.push(r?);
            }
        }
    }

    Ok(out)
}
