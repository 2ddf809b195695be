use serde::Serialize;

/// One work-day entry submitted by an auditor.
/// Thin wrapper around a `timesheet_records` row.
#[derive(Debug, Clone, Serialize)]
pub struct TimesheetRecord {
    pub id: i64,
    pub user_id: i64,
    pub work_date: String,          // ⇔ work_date (TEXT "YYYY-MM-DD")
    pub business_trip_days: i64,    // default 1
    pub actual_visit_days: i64,     // default 1
    pub audit_store_count: i64,     // default 1
    pub training_store_count: i64,  // default 0
    pub start_location: String,
    pub end_location: String,
    pub round_trip_distance: f64,   // km
    pub transport_mode: String,     // ⇔ transport_mode (driving/taxi/...)
    pub schedule_number: String,
    pub travel_hours: f64,
    pub visit_hours: f64,
    pub report_hours: f64,
    pub total_work_hours: f64,      // travel + visit + report
    pub notes: String,
    pub store_code: String,
    pub city: String,
    pub created_at: String,
}

/// A record joined with its owner, as the admin views need it.
#[derive(Debug, Clone, Serialize)]
pub struct RecordWithUser {
    #[serde(flatten)]
    pub record: TimesheetRecord,
    pub user_name: String,
    pub user_department: String,
}
