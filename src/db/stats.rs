use crate::errors::AppResult;
use crate::utils::date;
use rusqlite::{Connection, params};
use serde::Serialize;

/// Per-department aggregates for one month. Average daily hours use the same
/// formula as the specialist view: total hours ÷ actual visit days.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub work_days: i64,
    pub actual_visit_days: i64,
    pub total_hours: f64,
    pub avg_daily_hours: f64,
}

/// The admin overview numbers for a month.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub total_users: i64,
    pub today_records: i64,
    pub month_records: i64,
    pub total_hours: f64,
    pub department_stats: Vec<DepartmentStats>,
}

/// Monthly aggregates for a single user.
#[derive(Debug, Clone, Serialize)]
pub struct UserMonthStats {
    pub records_count: i64,
    pub total_work_hours: f64,
    pub total_travel_hours: f64,
    pub total_distance: f64,
    pub work_days: i64,
    pub avg_daily_hours: f64,
}

/// Overview for the given month bounds. `department` scopes the numbers for
/// managers; admins pass None and see everything.
pub fn overview(
    conn: &Connection,
    month_start: &str,
    month_end: &str,
    department: Option<&str>,
) -> AppResult<OverviewStats> {
    let today = date::today().format("%Y-%m-%d").to_string();

    let total_users: i64 = match department {
        Some(d) => conn.query_row(
            "SELECT COUNT(*) FROM users WHERE department = ?1",
            [d],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?,
    };

    let today_records: i64 = match department {
        Some(d) => conn.query_row(
            "SELECT COUNT(*) FROM timesheet_records t
             JOIN users u ON t.user_id = u.id
             WHERE t.work_date = ?1 AND u.department = ?2",
            params![today, d],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM timesheet_records WHERE work_date = ?1",
            [&today],
            |row| row.get(0),
        )?,
    };

    let (month_records, total_hours): (i64, f64) = match department {
        Some(d) => conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(t.total_work_hours), 0)
             FROM timesheet_records t
             JOIN users u ON t.user_id = u.id
             WHERE t.work_date >= ?1 AND t.work_date <= ?2 AND u.department = ?3",
            params![month_start, month_end, d],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(total_work_hours), 0)
             FROM timesheet_records
             WHERE work_date >= ?1 AND work_date <= ?2",
            params![month_start, month_end],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?,
    };

    let department_stats =
        department_breakdown(conn, month_start, month_end, department)?;

    Ok(OverviewStats {
        total_users,
        today_records,
        month_records,
        total_hours: (total_hours * 10.0).round() / 10.0,
        department_stats,
    })
}

fn department_breakdown(
    conn: &Connection,
    month_start: &str,
    month_end: &str,
    department: Option<&str>,
) -> AppResult<Vec<DepartmentStats>> {
    let base = "SELECT
            u.department,
            COUNT(DISTINCT t.work_date) AS work_days,
            COALESCE(SUM(t.actual_visit_days), 0) AS visit_days,
            COALESCE(SUM(t.total_work_hours), 0) AS total_hours
        FROM users u
        LEFT JOIN timesheet_records t
            ON u.id = t.user_id AND t.work_date >= ?1 AND t.work_date <= ?2
        WHERE u.department IS NOT NULL AND u.department != ''";

    let map = |row: &rusqlite::Row| -> rusqlite::Result<DepartmentStats> {
        let visit_days: i64 = row.get(2)?;
        let total_hours: f64 = row.get(3)?;
        let avg = if visit_days > 0 {
            ((total_hours / visit_days as f64) * 100.0).round() / 100.0
        } else {
            0.0
        };
        Ok(DepartmentStats {
            department: row.get(0)?,
            work_days: row.get(1)?,
            actual_visit_days: visit_days,
            total_hours,
            avg_daily_hours: avg,
        })
    };

    let mut out = Vec::new();
    match department {
        Some(d) => {
            let sql = format!("{} AND u.department = ?3 GROUP BY u.department", base);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![month_start, month_end, d], map)?;
            for r in rows {
                out.push(r?);
            }
        }
        None => {
            let sql = format!("{} GROUP BY u.department", base);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![month_start, month_end], map)?;
            for r in rows {
                out.push(r?);
            }
        }
    }

    // busiest departments first
    out.sort_by(|a, b| {
        b.avg_daily_hours
            .partial_cmp(&a.avg_daily_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(out)
}

/// Monthly aggregates for one user. Average daily hours divide by distinct
/// work days (min 1 to avoid division by zero).
pub fn user_month_stats(
    conn: &Connection,
    user_id: i64,
    month_start: &str,
    month_end: &str,
) -> AppResult<UserMonthStats> {
    let (records_count, total_work_hours, total_travel_hours, total_distance, work_days): (
        i64,
        f64,
        f64,
        f64,
        i64,
    ) = conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(total_work_hours), 0),
            COALESCE(SUM(travel_hours), 0),
            COALESCE(SUM(round_trip_distance), 0),
            COUNT(DISTINCT work_date)
         FROM timesheet_records
         WHERE user_id = ?1 AND work_date >= ?2 AND work_date <= ?3",
        params![user_id, month_start, month_end],
        |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        },
    )?;

    let avg = (total_work_hours / work_days.max(1) as f64 * 10.0).round() / 10.0;

    Ok(UserMonthStats {
        records_count,
        total_work_hours: (total_work_hours * 10.0).round() / 10.0,
        total_travel_hours: (total_travel_hours * 10.0).round() / 10.0,
        total_distance: (total_distance * 10.0).round() / 10.0,
        work_days,
        avg_daily_hours: avg,
    })
}
