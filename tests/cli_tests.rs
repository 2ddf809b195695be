use predicates::str::contains;

mod common;
use common::{flg, init_db, setup_test_db, write_store_csv};

#[test]
fn test_init_creates_schema() {
    let db_path = setup_test_db("init");

    flg()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    // schema is there: users, records, stores, defaults, log
    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    for table in [
        "users",
        "timesheet_records",
        "stores",
        "user_monthly_defaults",
        "log",
    ] {
        let found: bool = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")
            .unwrap()
            .exists([table])
            .unwrap();
        assert!(found, "missing table {}", table);
    }
}

#[test]
fn test_init_seeds_admin() {
    let db_path = setup_test_db("seed_admin");
    init_db(&db_path);

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let role: String = conn
        .query_row(
            "SELECT role FROM users WHERE username = 'admin'",
            [],
            |row| row.get(0),
        )
        .expect("admin exists");
    assert_eq!(role, "admin");
}

#[test]
fn test_init_is_idempotent() {
    let db_path = setup_test_db("reinit");
    init_db(&db_path);
    init_db(&db_path);

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let admins: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE username = 'admin'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(admins, 1);
}

#[test]
fn test_db_check_reports_ok() {
    let db_path = setup_test_db("integrity");
    init_db(&db_path);

    flg()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_db_info_shows_counts() {
    let db_path = setup_test_db("dbinfo");
    init_db(&db_path);

    flg()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Users:"))
        .stdout(contains("Records:"))
        .stdout(contains("Stores:"));
}

#[test]
fn test_db_missing_file_fails() {
    let db_path = setup_test_db("missing_db");
    // no init: the file does not exist

    flg()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .failure()
        .stderr(contains("Database not found"));
}

#[test]
fn test_import_stores_from_csv() {
    let db_path = setup_test_db("import_csv");
    init_db(&db_path);
    let csv_path = write_store_csv("import_csv_catalog");

    flg()
        .args(["--db", &db_path, "import-stores", "--file", &csv_path])
        .assert()
        .success()
        .stdout(contains("3 succeeded"));

    let conn = rusqlite::Connection::open(&db_path).expect("open db");
    let stores: i64 = conn
        .query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stores, 3);

    // reimport updates, does not duplicate
    flg()
        .args(["--db", &db_path, "import-stores", "--file", &csv_path])
        .assert()
        .success();

    let stores: i64 = conn
        .query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stores, 3);
}

#[test]
fn test_import_stores_missing_file() {
    let db_path = setup_test_db("import_missing");
    init_db(&db_path);

    flg()
        .args(["--db", &db_path, "import-stores", "--file", "/no/such/file.csv"])
        .assert()
        .failure()
        .stderr(contains("File not found"));
}

#[test]
fn test_log_print_shows_init_entry() {
    let db_path = setup_test_db("auditlog");
    init_db(&db_path);

    flg()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"));
}
