// src/export/model.rs

use crate::models::record::{RecordWithUser, TimesheetRecord};

/// Flattened row used by every export format.
#[derive(Debug, Clone)]
pub struct RecordExport {
    pub user_name: String,
    pub user_department: String,
    pub work_date: String,
    pub business_trip_days: i64,
    pub actual_visit_days: i64,
    pub audit_store_count: i64,
    pub start_location: String,
    pub end_location: String,
    pub round_trip_distance: f64,
    pub transport_mode: String,
    pub travel_hours: f64,
    pub visit_hours: f64,
    pub report_hours: f64,
    pub total_work_hours: f64,
    pub notes: String,
    pub store_code: String,
    pub city: String,
    pub created_at: String,
}

impl RecordExport {
    pub fn from_own_record(rec: &TimesheetRecord) -> Self {
        Self::build(rec, String::new(), String::new())
    }

    pub fn from_admin_record(rec: &RecordWithUser) -> Self {
        Self::build(
            &rec.record,
            rec.user_name.clone(),
            rec.user_department.clone(),
        )
    }

    fn build(rec: &TimesheetRecord, user_name: String, user_department: String) -> Self {
        Self {
            user_name,
            user_department,
            work_date: rec.work_date.clone(),
            business_trip_days: rec.business_trip_days,
            actual_visit_days: rec.actual_visit_days,
            audit_store_count: rec.audit_store_count,
            start_location: rec.start_location.clone(),
            end_location: rec.end_location.clone(),
            round_trip_distance: rec.round_trip_distance,
            transport_mode: rec.transport_mode.clone(),
            travel_hours: rec.travel_hours,
            visit_hours: rec.visit_hours,
            report_hours: rec.report_hours,
            total_work_hours: rec.total_work_hours,
            notes: rec.notes.clone(),
            store_code: rec.store_code.clone(),
            city: rec.city.clone(),
            created_at: rec.created_at.clone(),
        }
    }
}

pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "Auditor",
        "Department",
        "Work Date",
        "Trip Days",
        "Visit Days",
        "Stores Audited",
        "Start Location",
        "End Location",
        "Distance (km)",
        "Transport",
        "Travel Hours",
        "Visit Hours",
        "Report Hours",
        "Total Hours",
        "Notes",
        "Store Code",
        "City",
        "Created At",
    ]
}

pub(crate) fn record_to_row(rec: &RecordExport) -> Vec<String> {
    vec![
        rec.user_name.clone(),
        rec.user_department.clone(),
        rec.work_date.clone(),
        rec.business_trip_days.to_string(),
        rec.actual_visit_days.to_string(),
        rec.audit_store_count.to_string(),
        rec.start_location.clone(),
        rec.end_location.clone(),
        format!("{:.2}", rec.round_trip_distance),
        rec.transport_mode.clone(),
        format!("{:.2}", rec.travel_hours),
        format!("{:.2}", rec.visit_hours),
        format!("{:.2}", rec.report_hours),
        format!("{:.2}", rec.total_work_hours),
        rec.notes.clone(),
        rec.store_code.clone(),
        rec.city.clone(),
        rec.created_at.clone(),
    ]
}
