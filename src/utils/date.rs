use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a "YYYY-MM" month selector into (year, month).
pub fn parse_month(s: &str) -> AppResult<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&(s.to_string() + "-01"), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidMonth(s.to_string()))?;
    Ok((d.year(), d.month()))
}

/// First and last day of a month, as "YYYY-MM-DD" bounds for SQL BETWEEN.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(String, String)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidMonth(format!("{}-{:02}", year, month)))?;

    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::InvalidMonth(format!("{}-{:02}", year, month)))?;

    let last = next.pred_opt().unwrap_or(first);

    Ok((
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    ))
}

/// Month bounds for a "YYYY-MM" selector, defaulting to the current month.
pub fn month_bounds_for(selector: Option<&str>) -> AppResult<(String, String)> {
    match selector {
        Some(s) if !s.is_empty() => {
            let (y, m) = parse_month(s)?;
            month_bounds(y, m)
        }
        _ => {
            let t = today();
            month_bounds(t.year(), t.month())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_mid_year() {
        let (first, last) = month_bounds(2025, 6).unwrap();
        assert_eq!(first, "2025-06-01");
        assert_eq!(last, "2025-06-30");
    }

    #[test]
    fn month_bounds_december_rolls_year() {
        let (first, last) = month_bounds(2025, 12).unwrap();
        assert_eq!(first, "2025-12-01");
        assert_eq!(last, "2025-12-31");
    }

    #[test]
    fn month_bounds_february_leap() {
        let (_, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(last, "2024-02-29");
    }

    #[test]
    fn parse_month_rejects_garbage() {
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("not-a-month").is_err());
    }
}
