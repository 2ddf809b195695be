use predicates::str::contains;
use std::fs;

mod common;
use common::{flg, init_db, setup_test_db, temp_out};

/// Insert a user plus one record straight through the library DB API.
fn seed_record(db_path: &str, date: &str, hours: f64) {
    let conn = rusqlite::Connection::open(db_path).expect("open db");

    let uid: i64 = match conn
        .query_row("SELECT id FROM users WHERE username = 'tester'", [], |r| {
            r.get(0)
        }) {
        Ok(id) => id,
        Err(_) => {
            conn.execute(
                "INSERT INTO users (username, password, name, role, department)
                 VALUES ('tester', 'x', 'Test User', 'specialist', 'Audit Group 1')",
                [],
            )
            .unwrap();
            conn.last_insert_rowid()
        }
    };

    conn.execute(
        "INSERT INTO timesheet_records
            (user_id, work_date, start_location, end_location, round_trip_distance,
             transport_mode, travel_hours, visit_hours, report_hours, total_work_hours)
         VALUES (?1, ?2, 'Store A', 'Store B', 42.5, 'driving', 1.5, 0.92, 0.13, ?3)",
        rusqlite::params![uid, date, hours],
    )
    .unwrap();
}

#[test]
fn test_export_csv_writes_file_with_bom() {
    let db_path = setup_test_db("export_csv");
    init_db(&db_path);
    seed_record(&db_path, "2025-07-01", 2.55);

    let out = temp_out("export_csv", "csv");

    flg()
        .args(["--db", &db_path, "export", "--format", "csv", "--file", &out])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let bytes = fs::read(&out).expect("read exported csv");
    assert!(bytes.starts_with(b"\xef\xbb\xbf"), "missing UTF-8 BOM");

    let text = String::from_utf8_lossy(&bytes[3..]).to_string();
    assert!(text.lines().next().unwrap().contains("Work Date"));
    assert!(text.contains("2025-07-01"));
    assert!(text.contains("Test User"));
}

#[test]
fn test_export_xlsx_writes_file() {
    let db_path = setup_test_db("export_xlsx");
    init_db(&db_path);
    seed_record(&db_path, "2025-07-02", 8.0);

    let out = temp_out("export_xlsx", "xlsx");

    flg()
        .args(["--db", &db_path, "export", "--format", "xlsx", "--file", &out])
        .assert()
        .success()
        .stdout(contains("XLSX export completed"));

    let bytes = fs::read(&out).expect("read exported xlsx");
    // xlsx is a zip container
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_export_range_filters_by_month() {
    let db_path = setup_test_db("export_range");
    init_db(&db_path);
    seed_record(&db_path, "2025-07-01", 8.0);
    seed_record(&db_path, "2025-08-01", 6.0);

    let out = temp_out("export_range", "csv");

    flg()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out, "--range", "2025-07",
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).expect("read exported csv");
    assert!(text.contains("2025-07-01"));
    assert!(!text.contains("2025-08-01"));
}

#[test]
fn test_export_empty_range_warns_without_file() {
    let db_path = setup_test_db("export_empty");
    init_db(&db_path);

    let out = temp_out("export_empty", "csv");

    flg()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out, "--range", "2024-01",
        ])
        .assert()
        .success()
        .stdout(contains("No records found"));

    assert!(!std::path::Path::new(&out).exists());
}

#[test]
fn test_export_rejects_relative_path() {
    let db_path = setup_test_db("export_relpath");
    init_db(&db_path);

    flg()
        .args([
            "--db",
            &db_path,
            "export",
            "--format",
            "csv",
            "--file",
            "relative.csv",
        ])
        .assert()
        .failure()
        .stderr(contains("absolute"));
}

#[test]
fn test_export_force_overwrites_existing_file() {
    let db_path = setup_test_db("export_force");
    init_db(&db_path);
    seed_record(&db_path, "2025-07-01", 8.0);

    let out = temp_out("export_force", "csv");
    fs::write(&out, "old content").unwrap();

    flg()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &out, "--force",
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.contains("old content"));
    assert!(text.contains("2025-07-01"));
}
