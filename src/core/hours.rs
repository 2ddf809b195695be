//! Work-hour arithmetic for timesheet submissions.

use crate::models::transport::TransportMode;
use serde_json::Value;

/// Tolerant float extraction: the entry form submits numbers, numeric
/// strings, empty strings or the literal "undefined".
pub fn safe_float(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s == "undefined" {
                default
            } else {
                s.parse().unwrap_or(default)
            }
        }
        _ => default,
    }
}

/// Same tolerance for integers.
pub fn safe_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s == "undefined" {
                default
            } else {
                s.parse().unwrap_or(default)
            }
        }
        _ => default,
    }
}

/// Tolerant string extraction (null → empty).
pub fn safe_str(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourTotals {
    pub travel_hours: f64,
    pub visit_hours: f64,
    pub report_hours: f64,
    pub total_work_hours: f64,
}

/// Adjust travel hours for the transport mode (station/airport overhead)
/// and sum up the day. The invariant the rest of the system relies on:
/// total = travel + visit + report, after adjustment.
pub fn compute_totals(
    mode: TransportMode,
    travel_hours: f64,
    visit_hours: f64,
    report_hours: f64,
) -> HourTotals {
    let travel = travel_hours + mode.travel_hours_adjustment();
    HourTotals {
        travel_hours: travel,
        visit_hours,
        report_hours,
        total_work_hours: travel + visit_hours + report_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn totals_are_the_sum_of_parts() {
        let t = compute_totals(TransportMode::Driving, 1.5, 0.92, 0.13);
        assert!((t.total_work_hours - 2.55).abs() < 1e-9);
        assert_eq!(t.travel_hours, 1.5);
    }

    #[test]
    fn train_and_airplane_add_overhead() {
        let train = compute_totals(TransportMode::Train, 2.0, 1.0, 0.0);
        assert!((train.travel_hours - 3.0).abs() < 1e-9);
        assert!((train.total_work_hours - 4.0).abs() < 1e-9);

        let plane = compute_totals(TransportMode::Airplane, 2.0, 1.0, 0.0);
        assert!((plane.travel_hours - 4.0).abs() < 1e-9);
    }

    #[test]
    fn tolerant_parsing() {
        let body = json!({
            "a": "1.5",
            "b": "",
            "c": "undefined",
            "d": 3,
            "e": "not a number",
        });
        assert_eq!(safe_float(body.get("a"), 0.0), 1.5);
        assert_eq!(safe_float(body.get("b"), 0.92), 0.92);
        assert_eq!(safe_float(body.get("c"), 0.13), 0.13);
        assert_eq!(safe_float(body.get("missing"), 7.0), 7.0);
        assert_eq!(safe_int(body.get("d"), 0), 3);
        assert_eq!(safe_int(body.get("e"), 2), 2);
        assert_eq!(safe_str(body.get("a")), "1.5");
        assert_eq!(safe_str(body.get("missing")), "");
    }
}
