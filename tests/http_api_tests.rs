//! In-process HTTP flow tests: the axum router is driven directly with
//! tower's oneshot, replaying the session cookie between requests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use fieldlogger::config::Config;
use fieldlogger::db::initialize::init_db;
use fieldlogger::db::pool::DbPool;
use fieldlogger::web::{AppState, router};

fn test_app() -> Router {
    let pool = DbPool::open_in_memory().expect("open db");
    pool.with_conn(|conn| init_db(conn)).expect("init db");

    let cfg = Config {
        database: ":memory:".into(),
        ..Config::default()
    };

    router(AppState::new(pool, cfg))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(path);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).to_string());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, set_cookie, json)
}

async fn register(app: &Router, name: &str, phone: &str) {
    let (status, _, body) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": name,
            "password": "secret1",
            "department": "Audit Group 1",
            "phone": phone,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, cookie, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    cookie.expect("login sets a session cookie")
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let (status, _, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn registration_validation_and_duplicates() {
    let app = test_app();

    register(&app, "Mario Rossi", "13800000001").await;

    // duplicate name
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Mario Rossi",
            "password": "secret1",
            "department": "Audit Group 1",
            "phone": "13800000002",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // duplicate phone
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Luigi Verdi",
            "password": "secret1",
            "department": "Audit Group 1",
            "phone": "13800000001",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // short password
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Anna Bianchi",
            "password": "short",
            "department": "Audit Group 1",
            "phone": "13800000003",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // bad phone
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Anna Bianchi",
            "password": "secret1",
            "department": "Audit Group 1",
            "phone": "12345",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown department
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Anna Bianchi",
            "password": "secret1",
            "department": "No Such Group",
            "phone": "13800000003",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "Mario Rossi", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // and the right one works, session carries across requests
    let cookie = login(&app, "Mario Rossi", "secret1").await;
    let (status, _, body) = send(&app, "GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "Mario Rossi");
    assert_eq!(body["user"]["role"], "specialist");
}

#[tokio::test]
async fn timesheet_requires_login() {
    let app = test_app();
    let (status, _, _) = send(&app, "GET", "/api/timesheet", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn timesheet_create_computes_totals() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    // loose JSON: numbers as strings, missing keys
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&cookie),
        Some(json!({
            "workDate": "2025-07-01",
            "startStore": "Store A",
            "endStore": "Store B",
            "roundTripDistance": "42.5",
            "transportMode": "driving",
            "travelHours": "1.5",
            "visitHours": 0.92,
            "reportHours": "0.13",
            "businessTripDays": "",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);

    let (_, _, body) = send(&app, "GET", "/api/timesheet", Some(&cookie), None).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec["work_date"], "2025-07-01");
    assert_eq!(rec["business_trip_days"], 1); // tolerant default
    let total = rec["total_work_hours"].as_f64().unwrap();
    assert!((total - 2.55).abs() < 1e-9);

    // train adds one hour of travel overhead
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&cookie),
        Some(json!({
            "workDate": "2025-07-02",
            "transportMode": "train",
            "travelHours": 2.0,
            "visitHours": 1.0,
            "reportHours": 0.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, "GET", "/api/timesheet", Some(&cookie), None).await;
    let records = body["records"].as_array().unwrap();
    let train = records.iter().find(|r| r["work_date"] == "2025-07-02").unwrap();
    assert!((train["travel_hours"].as_f64().unwrap() - 3.0).abs() < 1e-9);
    assert!((train["total_work_hours"].as_f64().unwrap() - 4.0).abs() < 1e-9);

    // invalid date is rejected
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&cookie),
        Some(json!({"workDate": "not-a-date"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn timesheet_delete_is_owner_only() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    register(&app, "Luigi Verdi", "13800000002").await;

    let mario = login(&app, "Mario Rossi", "secret1").await;
    let luigi = login(&app, "Luigi Verdi", "secret1").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&mario),
        Some(json!({"workDate": "2025-07-01", "travelHours": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, "GET", "/api/timesheet", Some(&mario), None).await;
    let id = body["records"][0]["id"].as_i64().unwrap();

    // someone else cannot delete it
    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/api/timesheet/{}", id),
        Some(&luigi),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // the owner can
    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/api/timesheet/{}", id),
        Some(&mario),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, "GET", "/api/timesheet", Some(&mario), None).await;
    assert!(body["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn timesheet_csv_export_downloads() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&cookie),
        Some(json!({"workDate": "2025-07-01", "travelHours": 1.0})),
    )
    .await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/timesheet/export")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let ct = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(ct.starts_with("text/csv"));
    let cd = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(cd.contains("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"\xef\xbb\xbf"));
    assert!(String::from_utf8_lossy(&bytes).contains("2025-07-01"));
}

#[tokio::test]
async fn monthly_defaults_round_trip() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    // system fallback first
    let (_, _, body) = send(&app, "GET", "/api/monthly_defaults", Some(&cookie), None).await;
    assert_eq!(body["defaults"]["business_trip_days"], 1);
    assert_eq!(body["defaults"]["actual_visit_days"], 1);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/monthly_defaults",
        Some(&cookie),
        Some(json!({"business_trip_days": 5, "actual_visit_days": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, "GET", "/api/monthly_defaults", Some(&cookie), None).await;
    assert_eq!(body["defaults"]["business_trip_days"], 5);
    assert_eq!(body["defaults"]["actual_visit_days"], 4);
}

#[tokio::test]
async fn admin_endpoints_enforce_roles() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let specialist = login(&app, "Mario Rossi", "secret1").await;

    // specialist cannot see admin views
    let (status, _, _) = send(&app, "GET", "/api/admin/overview", Some(&specialist), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // seeded admin can
    let admin = login(&app, "admin", "admin123").await;
    let (status, _, body) = send(&app, "GET", "/api/admin/overview", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK, "overview failed: {}", body);
    assert!(body["totalUsers"].as_i64().unwrap() >= 2);

    let (_, _, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    let users = body["users"].as_array().unwrap();
    assert!(users.iter().any(|u| u["username"] == "Mario Rossi"));
    let mario_id = users
        .iter()
        .find(|u| u["username"] == "Mario Rossi")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    // promote to manager; the active session picks the new role up at once
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/update_user_role",
        Some(&admin),
        Some(json!({"user_id": mario_id, "role": "manager"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/admin/overview", Some(&specialist), None).await;
    assert_eq!(status, StatusCode::OK);

    // but managers still cannot mutate users
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/update_user_role",
        Some(&specialist),
        Some(json!({"user_id": mario_id, "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // unknown roles are rejected
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/update_user_role",
        Some(&admin),
        Some(json!({"user_id": mario_id, "role": "supervisor"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the built-in admin is protected
    let (_, _, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    let admin_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "admin")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/update_user_role",
        Some(&admin),
        Some(json!({"user_id": admin_id, "role": "specialist"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/delete_user",
        Some(&admin),
        Some(json!({"user_id": admin_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_delete_user_cascades_records() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let mario = login(&app, "Mario Rossi", "secret1").await;

    send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&mario),
        Some(json!({"workDate": "2025-07-01", "travelHours": 1.0})),
    )
    .await;

    let admin = login(&app, "admin", "admin123").await;
    let (_, _, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    let mario_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "Mario Rossi")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/delete_user",
        Some(&admin),
        Some(json!({"user_id": mario_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(&app, "GET", "/api/admin/records", Some(&admin), None).await;
    assert!(body["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stores_import_and_lookup() {
    let app = test_app();
    let admin = login(&app, "admin", "admin123").await;

    let csv = "store_code,store_name,city,address\n\
               HZ001,West Lake Store,Hangzhou,100 Wensan Rd\n\
               ,Broken Row,Hangzhou,\n\
               SH001,Xuhui Store,Shanghai,88 Caoxi Rd\n";

    let boundary = "XFIELDLOGGERBOUNDARY";
    let multipart_body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"stores.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = boundary,
        csv = csv
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/stores/import")
        .header(header::COOKIE, &admin)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(multipart_body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["report"]["success_count"], 2);
    assert_eq!(body["report"]["error_count"], 1);

    // any logged-in user can browse the catalog
    register(&app, "Mario Rossi", "13800000001").await;
    let user = login(&app, "Mario Rossi", "secret1").await;

    let (status, _, body) = send(&app, "GET", "/api/stores?search=HZ", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, _, body) = send(
        &app,
        "GET",
        "/api/stores/by-code/SH001",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"]["store_name"], "Xuhui Store");

    let (status, _, _) = send(
        &app,
        "GET",
        "/api/stores/by-code/NOPE",
        Some(&user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // import itself is admin-only
    let request = Request::builder()
        .method("POST")
        .uri("/api/stores/import")
        .header(header::COOKIE, &user)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(""))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn route_calculation_estimates_offline() {
    // no provider keys configured → straight-line estimation path
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/calculate_route",
        Some(&cookie),
        Some(json!({
            "start_store": "Hangzhou HQ",
            "end_store": "Shanghai Office",
            "transport_mode": "driving",
            "start_location": "120.1552,30.2741",
            "end_location": "121.4737,31.2304",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "route failed: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["api_used"], false);
    let distance = body["distance"].as_f64().unwrap();
    assert!(distance > 0.0);
    // parking overhead is included in the duration
    let duration = body["duration"].as_f64().unwrap();
    assert!(duration > 0.16);
}

#[tokio::test]
async fn provider_usage_reports_budget() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    let (status, _, body) = send(&app, "GET", "/api/provider_usage", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today_usage"], 0);
    assert_eq!(body["daily_limit"], 200);
    assert_eq!(body["remaining"], 200);
}

#[tokio::test]
async fn statistics_scoped_by_role() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    register(&app, "Luigi Verdi", "13800000002").await;
    let mario = login(&app, "Mario Rossi", "secret1").await;
    let luigi = login(&app, "Luigi Verdi", "secret1").await;

    send(
        &app,
        "POST",
        "/api/timesheet",
        Some(&mario),
        Some(json!({
            "workDate": "2025-07-01",
            "travelHours": 1.0,
            "visitHours": 6.0,
            "reportHours": 1.0,
        })),
    )
    .await;

    let (_, _, body) = send(&app, "GET", "/api/me", Some(&mario), None).await;
    let mario_id = body["user"]["id"].as_i64().unwrap();

    // own stats
    let (status, _, body) = send(
        &app,
        "GET",
        &format!("/api/statistics/{}?month=2025-07", mario_id),
        Some(&mario),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["records_count"], 1);
    assert_eq!(body["stats"]["work_days"], 1);
    assert!((body["stats"]["total_work_hours"].as_f64().unwrap() - 8.0).abs() < 1e-9);

    // a peer specialist cannot read them
    let (status, _, _) = send(
        &app,
        "GET",
        &format!("/api/statistics/{}?month=2025-07", mario_id),
        Some(&luigi),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // an admin can
    let admin = login(&app, "admin", "admin123").await;
    let (status, _, _) = send(
        &app,
        "GET",
        &format!("/api/statistics/{}?month=2025-07", mario_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = test_app();
    register(&app, "Mario Rossi", "13800000001").await;
    let cookie = login(&app, "Mario Rossi", "secret1").await;

    let (status, _, _) = send(&app, "POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/timesheet", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
