// src/export/csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::{RecordExport, get_headers, record_to_row};
use crate::export::notify_export_success;
use csv::Writer;
use std::path::Path;

/// UTF-8 BOM so spreadsheet software opens the file with the right encoding.
const BOM: &[u8] = b"\xef\xbb\xbf";

/// Render records to CSV bytes (with BOM), for HTTP downloads.
pub fn records_to_csv_bytes(records: &[RecordExport]) -> AppResult<Vec<u8>> {
    let mut out = Vec::from(BOM);

    {
        let mut wtr = Writer::from_writer(&mut out);
        wtr.write_record(get_headers())
            .map_err(|e| AppError::Export(e.to_string()))?;

        for rec in records {
            wtr.write_record(record_to_row(rec))
                .map_err(|e| AppError::Export(e.to_string()))?;
        }

        wtr.flush()?;
    }

    Ok(out)
}

/// Write records to a CSV file on disk (CLI export).
pub(crate) fn export_csv(records: &[RecordExport], path: &Path) -> AppResult<()> {
    let bytes = records_to_csv_bytes(records)?;
    std::fs::write(path, bytes)?;
    notify_export_success("CSV", path);
    Ok(())
}
