//! Registration, login and the session-based role guards.

use super::AppState;
use crate::core::password::{hash_password, verify_password};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::models::user::{User, UserInfo};
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

pub const SESSION_USER_ID_KEY: &str = "user_id";

fn session_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Other(format!("session error: {}", e))
}

/// Load the logged-in user from the session, if any. The role is re-read
/// from the database on every request so role changes apply immediately.
pub async fn current_user(session: &Session, db: &DbPool) -> AppResult<Option<User>> {
    let user_id: Option<i64> = session
        .get(SESSION_USER_ID_KEY)
        .await
        .map_err(session_err)?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    db.with_conn(|conn| users::find_by_id(conn, user_id))
}

pub async fn require_user(session: &Session, db: &DbPool) -> AppResult<User> {
    current_user(session, db)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Manager or admin.
pub async fn require_admin_view(session: &Session, db: &DbPool) -> AppResult<User> {
    let user = require_user(session, db).await?;
    if !user.role.can_view_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

/// Admin only.
pub async fn require_admin(session: &Session, db: &DbPool) -> AppResult<User> {
    let user = require_user(session, db).await?;
    if !user.role.can_manage_users() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub phone: String,
}

/// POST /api/register — the auditor's real name doubles as the username.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    let name = req.name.trim().to_string();
    let password = req.password.trim();
    let department = req.department.trim().to_string();
    let phone = req.phone.trim().to_string();

    if name.is_empty() || password.is_empty() || department.is_empty() || phone.is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }

    let name_len = name.chars().count();
    if !(2..=20).contains(&name_len) {
        return Err(AppError::Validation(
            "Name must be between 2 and 20 characters".into(),
        ));
    }

    if password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let phone_re = regex::Regex::new(r"^\d{11}$").unwrap();
    if !phone_re.is_match(&phone) {
        return Err(AppError::Validation(
            "Please enter a valid 11-digit phone number".into(),
        ));
    }

    if !state.cfg.departments.contains(&department) {
        return Err(AppError::Validation("Unknown department".into()));
    }

    let password_hash = hash_password(password)?;

    state.db.with_conn(|conn| {
        if users::find_by_username(conn, &name)?.is_some() {
            return Err(AppError::Validation(
                "This name is already registered, contact an administrator".into(),
            ));
        }
        if users::phone_taken(conn, &phone)? {
            return Err(AppError::Validation(
                "This phone number is already registered".into(),
            ));
        }

        users::insert_user(
            conn,
            &name,
            &password_hash,
            &name,
            Role::Specialist,
            &department,
            &phone,
        )?;
        audit(conn, "register", &name, "New user registered")?;

        Ok(())
    })?;

    tracing::info!(user = %name, %department, "user registered");

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful, please log in",
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    }

    let user = state
        .db
        .with_conn(|conn| users::find_by_username(conn, &req.username))?;

    let Some(user) = user else {
        tracing::warn!(user = %req.username, "login for unknown user");
        return Err(AppError::Validation("Invalid username or password".into()));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user = %req.username, "wrong password");
        return Err(AppError::Validation("Invalid username or password".into()));
    }

    session
        .insert(SESSION_USER_ID_KEY, user.id)
        .await
        .map_err(session_err)?;

    tracing::info!(user = %user.username, role = ?user.role, "login");

    Ok(Json(json!({
        "success": true,
        "user": user.to_info(),
    })))
}

/// POST /api/logout
pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    session.flush().await.map_err(session_err)?;
    Ok(Json(json!({"success": true})))
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, session: Session) -> AppResult<Json<Value>> {
    let user: Option<UserInfo> = current_user(&session, &state.db)
        .await?
        .map(|u| u.to_info());

    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}
