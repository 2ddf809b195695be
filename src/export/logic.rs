// src/export/logic.rs

use crate::db::pool::DbPool;
use crate::db::records::{self, RecordFilter};
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::csv::export_csv;
use crate::export::fs_utils::ensure_writable;
use crate::export::model::RecordExport;
use crate::export::xlsx::export_xlsx;
use crate::ui::messages::warning;
use crate::utils::date::month_bounds_for;
use std::io;
use std::path::Path;

/// High-level logic for the CLI `export` command.
pub struct ExportLogic;

impl ExportLogic {
    /// Export all timesheet records, optionally restricted to one month
    /// (`YYYY-MM`), to a CSV or XLSX file.
    pub fn export(
        pool: &DbPool,
        format: &ExportFormat,
        file: &str,
        range: &Option<String>,
        force: bool,
    ) -> AppResult<()> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::from(io::Error::other(format!(
                "Output file path must be absolute: {file}"
            ))));
        }

        ensure_writable(path, force)?;

        let filter = match range {
            Some(month) => {
                let (start, end) = month_bounds_for(Some(month))?;
                RecordFilter {
                    start_date: Some(start),
                    end_date: Some(end),
                    ..Default::default()
                }
            }
            None => RecordFilter::default(),
        };

        let records: Vec<RecordExport> = pool
            .with_conn(|conn| records::load_filtered(conn, &filter))?
            .iter()
            .map(RecordExport::from_admin_record)
            .collect();

        if records.is_empty() {
            warning("No records found for the selected range.");
            return Ok(());
        }

        match format {
            ExportFormat::Csv => export_csv(&records, path)?,
            ExportFormat::Xlsx => export_xlsx(&records, path)?,
        }

        Ok(())
    }
}
