use crate::core::password;
use crate::errors::AppResult;
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if a table exists.
fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Check if a table has a given column.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Has this migration version already been applied?
fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_migration_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT UNIQUE NOT NULL,
            password   TEXT NOT NULL,
            name       TEXT NOT NULL,
            role       TEXT NOT NULL DEFAULT 'specialist'
                       CHECK(role IN ('specialist','manager','admin')),
            department TEXT DEFAULT '',
            phone      TEXT DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;
    Ok(())
}

fn create_timesheet_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS timesheet_records (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id              INTEGER NOT NULL,
            work_date            TEXT NOT NULL,
            business_trip_days   INTEGER NOT NULL DEFAULT 1,
            actual_visit_days    INTEGER NOT NULL DEFAULT 1,
            audit_store_count    INTEGER NOT NULL DEFAULT 1,
            training_store_count INTEGER NOT NULL DEFAULT 0,
            start_location       TEXT DEFAULT '',
            end_location         TEXT DEFAULT '',
            round_trip_distance  REAL NOT NULL DEFAULT 0,
            transport_mode       TEXT NOT NULL DEFAULT 'driving',
            schedule_number      TEXT DEFAULT '',
            travel_hours         REAL NOT NULL DEFAULT 0,
            visit_hours          REAL NOT NULL DEFAULT 0.92,
            report_hours         REAL NOT NULL DEFAULT 0.13,
            total_work_hours     REAL NOT NULL DEFAULT 0,
            notes                TEXT DEFAULT '',
            store_code           TEXT DEFAULT '',
            city                 TEXT DEFAULT '',
            created_at           TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users (id)
        );

        CREATE INDEX IF NOT EXISTS idx_records_user_date ON timesheet_records(user_id, work_date);
        CREATE INDEX IF NOT EXISTS idx_records_date ON timesheet_records(work_date);
        "#,
    )?;
    Ok(())
}

fn create_stores_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS stores (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            store_code TEXT NOT NULL UNIQUE,
            store_name TEXT NOT NULL,
            store_city TEXT NOT NULL,
            longitude  REAL,
            latitude   REAL,
            address    TEXT DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_stores_city ON stores(store_city);
        "#,
    )?;
    Ok(())
}

fn create_monthly_defaults_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS user_monthly_defaults (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id            INTEGER NOT NULL,
            year               INTEGER NOT NULL,
            month              INTEGER NOT NULL,
            business_trip_days INTEGER NOT NULL DEFAULT 1,
            actual_visit_days  INTEGER NOT NULL DEFAULT 1,
            created_at         TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at         TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users (id),
            UNIQUE(user_id, year, month)
        );
        "#,
    )?;
    Ok(())
}

/// Early deployments had no phone column on users.
fn migrate_add_user_phone(conn: &Connection) -> Result<()> {
    let version = "20250301_0004_add_user_phone";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !has_column(conn, "users", "phone")? {
        conn.execute("ALTER TABLE users ADD COLUMN phone TEXT DEFAULT ''", [])?;
        success("Added 'phone' column to users table.");
    }

    mark_migration_applied(conn, version, "Added phone column to users")?;
    Ok(())
}

/// store_code/city arrived on records after the store catalog was introduced.
fn migrate_add_record_store_fields(conn: &Connection) -> Result<()> {
    let version = "20250420_0007_add_record_store_fields";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !has_column(conn, "timesheet_records", "store_code")? {
        conn.execute(
            "ALTER TABLE timesheet_records ADD COLUMN store_code TEXT DEFAULT ''",
            [],
        )?;
        success("Added 'store_code' column to timesheet_records table.");
    }
    if !has_column(conn, "timesheet_records", "city")? {
        conn.execute(
            "ALTER TABLE timesheet_records ADD COLUMN city TEXT DEFAULT ''",
            [],
        )?;
        success("Added 'city' column to timesheet_records table.");
    }

    mark_migration_applied(conn, version, "Added store_code/city columns to records")?;
    Ok(())
}

/// Seed the built-in admin account on a fresh database. The account is
/// protected from role changes and deletion everywhere else.
pub fn seed_admin(conn: &Connection) -> AppResult<()> {
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE username = 'admin'", [], |row| {
            row.get(0)
        })
        .optional()?;

    if exists.is_some() {
        return Ok(());
    }

    let hash = password::hash_password("admin123")?;
    conn.execute(
        "INSERT INTO users (username, password, name, role, department)
         VALUES ('admin', ?1, 'Administrator', 'admin', '')",
        [hash],
    )?;

    success("Seeded 'admin' account (password 'admin123' — change it).");
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Base tables
    let fresh = !table_exists(conn, "users")?;

    create_users_table(conn)?;
    create_timesheet_table(conn)?;
    create_stores_table(conn)?;
    create_monthly_defaults_table(conn)?;

    if fresh {
        success("Created base schema (users, timesheet_records, stores, monthly defaults).");
    }

    // 3) Additive column migrations for databases created before those fields
    migrate_add_user_phone(conn)?;
    migrate_add_record_store_fields(conn)?;

    Ok(())
}
