//! CSV side of the store import.

use super::{SheetRow, assign_field, map_headers};
use crate::errors::{AppError, AppResult};

pub(crate) fn parse(bytes: &[u8]) -> AppResult<Vec<SheetRow>> {
    // strip a UTF-8 BOM if the sheet came out of Excel
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Import(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let fields = map_headers(&headers)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = i + 2, error = %e, "skipping unreadable CSV line");
                continue;
            }
        };

        let mut row = SheetRow {
            line: i + 2, // header is line 1
            ..Default::default()
        };

        for (col, value) in record.iter().enumerate() {
            if let Some(Some(field)) = fields.get(col) {
                assign_field(&mut row, field, value);
            }
        }

        rows.push(row);
    }

    Ok(rows)
}
