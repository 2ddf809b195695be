//! Store catalog import from spreadsheet uploads (.xlsx or .csv).
//!
//! Rows are upserted by store code. Rows missing a required column are
//! skipped and reported; the response carries the first few row errors so
//! the admin can fix the sheet.

mod csv_rows;
mod xlsx_rows;

use crate::db::log::audit;
use crate::db::stores::upsert_store;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use serde::Serialize;

/// How many row errors the report carries back.
const MAX_REPORTED_ERRORS: usize = 10;

/// One raw spreadsheet row, header-mapped but not yet validated.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    pub line: usize, // 1-based spreadsheet line, for error messages
    pub store_code: String,
    pub store_name: String,
    pub store_city: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub success_count: usize,
    pub error_count: usize,
    pub created: usize,
    pub updated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_details: Vec<String>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "Import finished: {} succeeded, {} failed",
            self.success_count, self.error_count
        )
    }
}

/// Columns accepted for each field. The catalog sheets circulate in both
/// English and the original Chinese headers.
fn header_field(header: &str) -> Option<&'static str> {
    let h = header.trim().to_lowercase();
    match h.as_str() {
        "store_code" | "code" | "门店编码" => Some("store_code"),
        "store_name" | "name" | "门店名称" => Some("store_name"),
        "store_city" | "city" | "城市" => Some("store_city"),
        "address" | "地址" => Some("address"),
        "longitude" | "lng" | "经度" => Some("longitude"),
        "latitude" | "lat" | "纬度" => Some("latitude"),
        _ => None,
    }
}

/// Required fields a header row must provide.
const REQUIRED_FIELDS: &[&str] = &["store_code", "store_name", "store_city"];

/// Map a header row to field positions. Errors when a required column is
/// missing entirely.
fn map_headers(headers: &[String]) -> AppResult<Vec<Option<&'static str>>> {
    let mapped: Vec<Option<&'static str>> =
        headers.iter().map(|h| header_field(h)).collect();

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !mapped.contains(&Some(**f)))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(AppError::Import(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    Ok(mapped)
}

fn assign_field(row: &mut SheetRow, field: &str, value: &str) {
    let value = value.trim();
    match field {
        "store_code" => row.store_code = value.to_string(),
        "store_name" => row.store_name = value.to_string(),
        "store_city" => row.store_city = value.to_string(),
        "address" => row.address = value.to_string(),
        "longitude" => row.longitude = value.parse().ok(),
        "latitude" => row.latitude = value.parse().ok(),
        _ => {}
    }
}

/// Parse an upload by file extension into raw rows.
pub fn parse_spreadsheet(filename: &str, bytes: &[u8]) -> AppResult<Vec<SheetRow>> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        xlsx_rows::parse(bytes)
    } else if lower.ends_with(".csv") {
        csv_rows::parse(bytes)
    } else {
        Err(AppError::Import(
            "Unsupported file format: upload .xlsx or .csv".into(),
        ))
    }
}

/// Validate and upsert parsed rows.
pub fn apply_rows(conn: &Connection, rows: &[SheetRow]) -> AppResult<ImportReport> {
    let mut report = ImportReport {
        success_count: 0,
        error_count: 0,
        created: 0,
        updated: 0,
        error_details: Vec::new(),
    };

    for row in rows {
        if row.store_code.is_empty() || row.store_name.is_empty() || row.store_city.is_empty() {
            report.error_count += 1;
            if report.error_details.len() < MAX_REPORTED_ERRORS {
                report.error_details.push(format!(
                    "line {}: store code, name and city must not be empty",
                    row.line
                ));
            }
            continue;
        }

        match upsert_store(
            conn,
            &row.store_code,
            &row.store_name,
            &row.store_city,
            row.longitude,
            row.latitude,
            &row.address,
        ) {
            Ok(created) => {
                report.success_count += 1;
                if created {
                    report.created += 1;
                } else {
                    report.updated += 1;
                }
            }
            Err(e) => {
                report.error_count += 1;
                if report.error_details.len() < MAX_REPORTED_ERRORS {
                    report
                        .error_details
                        .push(format!("line {}: {}", row.line, e));
                }
            }
        }
    }

    Ok(report)
}

/// Full import path: parse, upsert, audit.
pub fn import_stores(conn: &Connection, filename: &str, bytes: &[u8]) -> AppResult<ImportReport> {
    let rows = parse_spreadsheet(filename, bytes)?;
    let report = apply_rows(conn, rows.as_slice())?;

    audit(conn, "store_import", filename, &report.summary())?;
    tracing::info!(
        file = filename,
        ok = report.success_count,
        failed = report.error_count,
        "store import finished"
    );

    Ok(report)
}
