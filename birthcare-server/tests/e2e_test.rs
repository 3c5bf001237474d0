//! End-to-end integration test
//!
//! Runs the console on a random port in front of a mock birthcare API and
//! drives it over HTTP.

use birthcare_server::{build_router, config::ServerConfig, AppState};
use birthcare_store::{AuditLog, SqliteDischargeStore};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "owner-token";
const STATUS_PATH: &str = "/api/birthcare/1/patient-admissions/12/status";

/// Start a console on a random port, returns (base_url, _temp_dir)
async fn start_console(upstream: &MockServer, auth_required: bool) -> (String, TempDir) {
    let temp_dir = TempDir::new().unwrap();

    let mut config = ServerConfig::default();
    config.upstream.base_url = upstream.uri();
    config.auth.required = auth_required;
    config.storage.data_dir = temp_dir.path().to_path_buf();

    let discharge = SqliteDischargeStore::open(config.discharge_db_path()).unwrap();
    let audit = AuditLog::open(config.audit_db_path()).unwrap();
    let state = Arc::new(AppState::new(config, Box::new(discharge), audit).unwrap());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{}", addr), temp_dir)
}

async fn patch_count(upstream: &MockServer) -> usize {
    upstream
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .count()
}

async fn select_discharged(client: &reqwest::Client, base_url: &str) -> reqwest::Response {
    client
        .patch(format!("{}{}", base_url, STATUS_PATH))
        .bearer_auth(TOKEN)
        .json(&json!({"status": "discharged", "patient_id": 5, "current_status": "delivered"}))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_check_is_public() {
    let upstream = MockServer::start().await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_redirects_to_login() {
    let upstream = MockServer::start().await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::get(format!("{}/api/owner/birthcare", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["location"], "/login");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["login"], "/login");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_discharge_sequence() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(STATUS_PATH))
        .and(body_json(json!({"status": "discharged"})))
        .and(header("authorization", "Bearer owner-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 12, "status": "discharged"})),
        )
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;
    let client = reqwest::Client::new();

    // Mother slip first, no status update
    let resp = select_discharged(&client, &base_url).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "open_mother_slip");
    assert_eq!(body["stage"], "mother_slip_created");
    assert_eq!(
        body["open_url"],
        "/birthcare/1/mother-discharge?patientId=5&admissionId=12"
    );
    assert!(body["status"].is_null());
    assert_eq!(patch_count(&upstream).await, 0);

    // Newborn slip together with exactly one status update
    let resp = select_discharged(&client, &base_url).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "open_newborn_slip_and_discharge");
    assert_eq!(body["stage"], "discharged");
    assert_eq!(body["status"], "discharged");
    assert_eq!(
        body["open_url"],
        "/birthcare/1/newborn-discharge?patientId=5&admissionId=12"
    );
    assert_eq!(patch_count(&upstream).await, 1);

    // Third selection does nothing
    let resp = select_discharged(&client, &base_url).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "already_discharged");
    assert_eq!(body["message"], "Patient is already discharged.");
    assert_eq!(patch_count(&upstream).await, 1);

    let resp = client
        .get(format!(
            "{}/api/birthcare/1/patient-admissions/12/discharge",
            base_url
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["stage"], "discharged");
    assert_eq!(body["patient_id"], 5);
}

#[tokio::test]
async fn test_failed_discharge_update_is_not_retried() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Database down"})))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;
    let client = reqwest::Client::new();

    select_discharged(&client, &base_url).await;
    let resp = select_discharged(&client, &base_url).await;
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Server error (500): Database down");
    assert_eq!(body["upstream_status"], 500);
    assert_eq!(body["stage"], "newborn_slip_created");
    assert_eq!(body["action"], "open_newborn_slip_and_discharge");

    // Further selections send nothing
    let resp = select_discharged(&client, &base_url).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "already_discharged");
    assert_eq!(body["message"], "Patient is already discharged.");
    assert_eq!(body["stage"], "newborn_slip_created");
    assert!(body["open_url"].is_null());
    assert_eq!(patch_count(&upstream).await, 1);
}

#[tokio::test]
async fn test_selection_during_discharge_update_sends_nothing() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(STATUS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "discharged"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;
    let client = reqwest::Client::new();

    select_discharged(&client, &base_url).await;

    let second = {
        let client = client.clone();
        let base_url = base_url.clone();
        tokio::spawn(async move { select_discharged(&client, &base_url).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let third: Value = select_discharged(&client, &base_url).await.json().await.unwrap();
    let second: Value = second.await.unwrap().json().await.unwrap();

    assert_eq!(second["action"], "open_newborn_slip_and_discharge");
    assert_eq!(second["stage"], "discharged");
    assert_eq!(third["action"], "already_discharged");
    assert_eq!(patch_count(&upstream).await, 1);
}

#[tokio::test]
async fn test_discharged_row_without_stored_stage_is_noop() {
    let upstream = MockServer::start().await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .patch(format!("{}{}", base_url, STATUS_PATH))
        .bearer_auth(TOKEN)
        .json(&json!({"status": "discharged", "current_status": "discharged"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "already_discharged");
    assert_eq!(body["status"], "discharged");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_status_change_resets_discharge() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;
    let client = reqwest::Client::new();

    select_discharged(&client, &base_url).await;
    select_discharged(&client, &base_url).await;

    let resp = client
        .patch(format!("{}{}", base_url, STATUS_PATH))
        .bearer_auth(TOKEN)
        .json(&json!({"status": "in-labor"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["action"], "status_updated");
    assert_eq!(body["message"], "Status updated to In Labor");
    assert_eq!(body["stage"], "not_started");

    let body: Value = select_discharged(&client, &base_url).await.json().await.unwrap();
    assert_eq!(body["action"], "open_mother_slip");
}

#[tokio::test]
async fn test_first_discharge_needs_patient_id() {
    let upstream = MockServer::start().await;
    let (base_url, _dir) = start_console(&upstream, false).await;

    let resp = reqwest::Client::new()
        .patch(format!("{}{}", base_url, STATUS_PATH))
        .json(&json!({"status": "discharged"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    assert_eq!(patch_count(&upstream).await, 0);
}

#[tokio::test]
async fn test_blank_rejection_reason_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .post(format!(
            "{}/api/admin/birthcare-applications/7/reject",
            base_url
        ))
        .bearer_auth(TOKEN)
        .json(&json!({"reason": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["reason"][0], "A rejection reason is required");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_forwards_trimmed_reason() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/birthcare-applications/7/reject"))
        .and(body_json(json!({"reason": "Expired permit"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Rejected"})))
        .expect(1)
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .post(format!(
            "{}/api/admin/birthcare-applications/7/reject",
            base_url
        ))
        .bearer_auth(TOKEN)
        .json(&json!({"reason": "  Expired permit "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn test_upstream_unauthorized_points_to_login() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/owner/birthcare"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .get(format!("{}/api/owner/birthcare", base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["location"], "/login");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["login"], "/login");
}

#[tokio::test]
async fn test_upstream_validation_errors_are_flattened() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/birthcare/1/patient-admissions"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"bed_id": ["The bed is occupied."]}
        })))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/birthcare/1/patient-admissions", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({
            "patient_id": 5,
            "room_id": 2,
            "bed_id": 3,
            "admission_date": "2024-06-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "The given data was invalid.\nThe bed is occupied."
    );
    assert_eq!(body["errors"]["bed_id"][0], "The bed is occupied.");
}

#[tokio::test]
async fn test_list_query_is_forwarded() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/birthcare/1/patient-admissions"))
        .and(query_param("page", "2"))
        .and(query_param("search", "reyes"))
        .and(query_param("status", "delivered"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 12, "patient_id": 5, "status": "delivered"}],
            "total": 11,
            "last_page": 2
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .get(format!(
            "{}/api/birthcare/1/patient-admissions?page=2&search=reyes&status=delivered",
            base_url
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 11);
    assert_eq!(body["data"][0]["status"], "delivered");
}

#[tokio::test]
async fn test_birth_details_saves_every_baby() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/birthcare/1/patient-documents/from-data"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 40, "patient_id": 5, "title": "Birth Details"
        })))
        .expect(2)
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/birthcare/1/birth-details", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({
            "patient_id": 5,
            "admission_id": 12,
            "form": {
                "shared": {"date_of_delivery": "2024-06-01", "attendant": "Midwife Reyes"},
                "plurality": "twin",
                "babies": [{"sex": "female"}, {"sex": "male"}]
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["saved"], 2);
    assert_eq!(body["message"], "Birth details saved for 2 babies");
}

#[tokio::test]
async fn test_birth_details_reports_partial_save() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/birthcare/1/patient-documents/from-data"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 40, "patient_id": 5, "title": "Birth Details"
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/birthcare/1/patient-documents/from-data"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Disk full"})))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/birthcare/1/birth-details", base_url))
        .bearer_auth(TOKEN)
        .json(&json!({
            "patient_id": 5,
            "form": {
                "shared": {"date_of_delivery": "2024-06-01"},
                "plurality": "triplet",
                "babies": [{}, {}, {}]
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["saved"], 1);
    assert_eq!(body["total"], 3);
    assert_eq!(
        body["message"],
        "Server error (500): Disk full (1 of 3 babies were saved)"
    );
}

#[tokio::test]
async fn test_statement_of_account_summary() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/birthcare/1/payments/soa"))
        .and(query_param("patient_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "patient": {"id": 5, "first_name": "Ana", "last_name": "Reyes"},
            "charges": [
                {"description": "Room and board", "quantity": 2, "unit_price": 1500.0},
                {"description": "Delivery package", "unit_price": 8000}
            ],
            "payments": [{"id": 1, "paid_at": "2024-06-02", "amount": 5000}]
        })))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, true).await;

    let resp = reqwest::Client::new()
        .get(format!(
            "{}/api/birthcare/1/payments/soa?patient_id=5",
            base_url
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["computed"]["total_charges"], 11000.0);
    assert_eq!(body["totals"]["balance"], 6000.0);
    assert_eq!(body["formatted"]["balance"], "₱6,000.00");
    assert_eq!(body["matches_backend"], true);
}

#[tokio::test]
async fn test_status_reports_discharge_counts() {
    let upstream = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&upstream)
        .await;
    let (base_url, _dir) = start_console(&upstream, false).await;
    let client = reqwest::Client::new();

    select_discharged(&client, &base_url).await;

    let body: Value = client
        .get(format!("{}/status", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["discharge"]["in_progress"], 1);
    assert_eq!(body["discharge"]["discharged"], 0);
    assert_eq!(body["storage_backend"], "sqlite");
}
