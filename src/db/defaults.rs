use crate::errors::AppResult;
use crate::models::monthly_default::MonthlyDefaults;
use rusqlite::{Connection, OptionalExtension, params};

/// Defaults for a user's month, or the system fallback (1, 1).
pub fn load_defaults(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u32,
) -> AppResult<MonthlyDefaults> {
    let row: Option<(i64, i64)> = conn
        .query_row(
            "SELECT business_trip_days, actual_visit_days
             FROM user_monthly_defaults
             WHERE user_id = ?1 AND year = ?2 AND month = ?3",
            params![user_id, year, month],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(match row {
        Some((trip, visit)) => MonthlyDefaults {
            business_trip_days: trip,
            actual_visit_days: visit,
        },
        None => MonthlyDefaults::default(),
    })
}

/// Upsert the month's defaults (unique on user_id + year + month).
pub fn save_defaults(
    conn: &Connection,
    user_id: i64,
    year: i32,
    month: u32,
    defaults: MonthlyDefaults,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO user_monthly_defaults
             (user_id, year, month, business_trip_days, actual_visit_days, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
         ON CONFLICT(user_id, year, month) DO UPDATE SET
             business_trip_days = ?4,
             actual_visit_days = ?5,
             updated_at = datetime('now')",
        params![
            user_id,
            year,
            month,
            defaults.business_trip_days,
            defaults.actual_visit_days
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::users::insert_user;
    use crate::models::role::Role;

    #[test]
    fn fallback_then_upsert() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let uid = insert_user(&conn, "u", "h", "U", Role::Specialist, "", "").unwrap();

        let d = load_defaults(&conn, uid, 2025, 7).unwrap();
        assert_eq!(d.business_trip_days, 1);
        assert_eq!(d.actual_visit_days, 1);

        save_defaults(
            &conn,
            uid,
            2025,
            7,
            MonthlyDefaults {
                business_trip_days: 5,
                actual_visit_days: 4,
            },
        )
        .unwrap();

        // second save on the same month updates instead of duplicating
        save_defaults(
            &conn,
            uid,
            2025,
            7,
            MonthlyDefaults {
                business_trip_days: 6,
                actual_visit_days: 4,
            },
        )
        .unwrap();

        let d = load_defaults(&conn, uid, 2025, 7).unwrap();
        assert_eq!(d.business_trip_days, 6);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_monthly_defaults", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
