use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use rusqlite::OptionalExtension;
use std::fs;

/// Run PRAGMA integrity_check and report the result.
pub fn integrity_check(pool: &DbPool) -> AppResult<bool> {
    pool.with_conn(|conn| {
        let verdict: String =
            conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(verdict == "ok")
    })
}

/// Reclaim free pages.
pub fn vacuum(pool: &DbPool) -> AppResult<()> {
    pool.with_conn(|conn| {
        conn.execute_batch("VACUUM;")?;
        Ok(())
    })
}

/// Print a short summary of the database: file size, row counts, date range.
pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("• File: {}", db_path);
    println!("• Size: {:.2} MB", file_mb);

    pool.with_conn(|conn| {
        //
        // 2) ROW COUNTS
        //
        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let records: i64 =
            conn.query_row("SELECT COUNT(*) FROM timesheet_records", [], |row| row.get(0))?;
        let stores: i64 = conn.query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))?;

        println!("• Users:   {}", users);
        println!("• Records: {}", records);
        println!("• Stores:  {}", stores);

        //
        // 3) DATE RANGE
        //
        let first: Option<String> = conn
            .query_row(
                "SELECT work_date FROM timesheet_records ORDER BY work_date ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last: Option<String> = conn
            .query_row(
                "SELECT work_date FROM timesheet_records ORDER BY work_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        println!("• Date range:");
        println!("    from: {}", first.unwrap_or_else(|| "--".into()));
        println!("    to:   {}", last.unwrap_or_else(|| "--".into()));

        Ok(())
    })?;

    println!();
    Ok(())
}

/// Guard against pointing maintenance commands at a missing file.
pub fn require_db_file(db_path: &str) -> AppResult<()> {
    if !std::path::Path::new(db_path).exists() {
        return Err(AppError::Config(format!(
            "Database not found: {} (run 'init' first)",
            db_path
        )));
    }
    Ok(())
}
