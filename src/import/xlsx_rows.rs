//! Excel side of the store import. Only the first worksheet is read.

use super::{SheetRow, assign_field, map_headers};
use crate::errors::{AppError, AppResult};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

pub(crate) fn parse(bytes: &[u8]) -> AppResult<Vec<SheetRow>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor)
        .map_err(|e| AppError::Import(format!("Failed to open spreadsheet: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Import("Spreadsheet has no worksheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Import(format!("Failed to read worksheet: {}", e)))?;

    let mut rows_iter = range.rows();

    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| AppError::Import("Spreadsheet is empty".into()))?
        .iter()
        .map(cell_to_string)
        .collect();

    let fields = map_headers(&headers)?;

    let mut rows = Vec::new();
    for (i, cells) in rows_iter.enumerate() {
        let mut row = SheetRow {
            line: i + 2, // header is line 1
            ..Default::default()
        };

        for (col, cell) in cells.iter().enumerate() {
            if let Some(Some(field)) = fields.get(col) {
                assign_field(&mut row, field, &cell_to_string(cell));
            }
        }

        // fully blank lines are common at the bottom of hand-edited sheets
        if row.store_code.is_empty()
            && row.store_name.is_empty()
            && row.store_city.is_empty()
            && row.address.is_empty()
        {
            continue;
        }

        rows.push(row);
    }

    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                format!("{f}")
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_owned(),
        Data::DateTime(dt) => format!("{dt}"),
        Data::Error(e) => format!("#ERROR: {e:?}"),
    }
}
