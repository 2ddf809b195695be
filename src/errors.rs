//! Unified application error type.
//! All modules (db, geo, web, cli, import/export) return AppError to keep
//! the error handling consistent and easy to manage.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid month format: {0}")]
    InvalidMonth(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid transport mode: {0}")]
    InvalidTransportMode(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    // ---------------------------
    // Auth / permission
    // ---------------------------
    #[error("Not logged in")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    // ---------------------------
    // Request validation
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    // ---------------------------
    // Outbound provider calls
    // ---------------------------
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Import / export errors
    // ---------------------------
    #[error("Import error: {0}")]
    Import(String),

    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidDate(_)
            | AppError::InvalidMonth(_)
            | AppError::InvalidRole(_)
            | AppError::InvalidTransportMode(_)
            | AppError::InvalidCoordinate(_)
            | AppError::Import(_)
            | AppError::InvalidExportFormat(_) => StatusCode::BAD_REQUEST,
            AppError::Http(_) | AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the client. Internal failures are
    /// collapsed into a generic line, everything else is self-describing.
    fn public_message(&self) -> String {
        match self {
            AppError::Io(_) | AppError::Db(_) | AppError::Migration(_) | AppError::Other(_) => {
                "Service temporarily unavailable, please retry later".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Every handler failure becomes the flat JSON payload the frontend expects:
/// `{"success": false, "message": "..."}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
        }));
        (status, body).into_response()
    }
}
