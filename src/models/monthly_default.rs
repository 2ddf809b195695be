use serde::Serialize;

/// Per-user per-month default day counts, pre-filled into the entry form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthlyDefaults {
    pub business_trip_days: i64,
    pub actual_visit_days: i64,
}

impl Default for MonthlyDefaults {
    fn default() -> Self {
        Self {
            business_trip_days: 1,
            actual_visit_days: 1,
        }
    }
}
