use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::user::User;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidRole(role_str.clone())),
        )
    })?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password")?,
        name: row.get("name")?,
        role,
        department: row.get::<_, Option<String>>("department")?.unwrap_or_default(),
        phone: row.get::<_, Option<String>>("phone")?.unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    name: &str,
    role: Role,
    department: &str,
    phone: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO users (username, password, name, role, department, phone)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![username, password_hash, name, role.to_db_str(), department, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_username(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE username = ?1")?;
    let user = stmt.query_row([username], map_row).optional()?;
    Ok(user)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;
    let user = stmt.query_row([id], map_row).optional()?;
    Ok(user)
}

pub fn phone_taken(conn: &Connection, phone: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM users WHERE phone = ?1 AND phone != '' LIMIT 1")?;
    Ok(stmt.exists([phone])?)
}

/// All users, newest registrations first.
pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at DESC, id DESC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_role(conn: &Connection, user_id: i64, role: Role) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role.to_db_str(), user_id],
    )?;
    Ok(())
}

/// Delete a user and everything that hangs off them: timesheet records and
/// monthly defaults go first, then the user row.
pub fn delete_user(conn: &mut Connection, user_id: i64) -> AppResult<()> {
    let tx = conn.transaction()?;

    tx.execute(
        "DELETE FROM timesheet_records WHERE user_id = ?1",
        [user_id],
    )?;
    tx.execute(
        "DELETE FROM user_monthly_defaults WHERE user_id = ?1",
        [user_id],
    )?;
    tx.execute("DELETE FROM users WHERE id = ?1", [user_id])?;

    tx.commit()?;
    Ok(())
}
