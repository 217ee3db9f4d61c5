//! End-to-end API tests.
//!
//! Each test builds the real router over an isolated in-memory database
//! and drives it in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rxledger_core::{CreateMedication, Role, Schedule, Unit};
use rxledger_db::{Database, DbConfig};
use rxledger_server::{create_router, AppState};

struct TestApp {
    router: Router,
    medication_id: String,
    nurse_id: String,
    witness_id: String,
}

/// Builds a router over a fresh database seeded with one medication
/// (Morphine Sulfate, 500 mg) and a nurse/witness pair.
async fn test_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let medication = db
        .medications()
        .insert(&CreateMedication {
            name: "Morphine Sulfate".to_string(),
            schedule: Schedule::II,
            unit: Unit::Mg,
            slug: "morphine-sulfate".to_string(),
            stock_quantity: 500,
        })
        .await
        .unwrap();

    let nurse = db
        .users()
        .insert("nurse@hospital.com", "Jane Smith", Role::Nurse)
        .await
        .unwrap();
    let witness = db
        .users()
        .insert("witness@hospital.com", "John Doe", Role::Witness)
        .await
        .unwrap();

    TestApp {
        router: create_router(AppState { db }),
        medication_id: medication.id,
        nurse_id: nurse.id,
        witness_id: witness.id,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn checkout_body(app: &TestApp, quantity: i64) -> Value {
    json!({
        "medicationId": app.medication_id,
        "nurseId": app.nurse_id,
        "witnessId": app.witness_id,
        "type": "CHECKOUT",
        "quantity": quantity,
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_check_reports_ok() {
    let app = test_app().await;
    let (status, body) = get(&app.router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Transactions
// =============================================================================

#[tokio::test]
async fn checkout_decrements_stock_and_returns_joined_view() {
    let app = test_app().await;
    let (status, body) = post(&app.router, "/api/transactions", checkout_body(&app, 50)).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["type"], "CHECKOUT");
    assert_eq!(data["quantity"], 50);
    assert_eq!(data["medication"]["stockQuantity"], 450);
    assert_eq!(data["nurse"]["name"], "Jane Smith");
    assert_eq!(data["witness"]["email"], "witness@hospital.com");
    // Role is never exposed through joins
    assert!(data["nurse"].get("role").is_none());
}

#[tokio::test]
async fn insufficient_stock_rejected_with_available_amount() {
    let app = test_app().await;
    let (status, body) = post(&app.router, "/api/transactions", checkout_body(&app, 600)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient stock. Available: 500 mg");

    // And the failed attempt left no trace
    let (_, list) = get(&app.router, "/api/transactions").await;
    assert_eq!(list["pagination"]["total"], 0);
    let (_, audit) = get(&app.router, "/api/audit-log").await;
    assert_eq!(audit["pagination"]["total"], 0);
}

#[tokio::test]
async fn checkout_to_exactly_zero_succeeds() {
    let app = test_app().await;
    let (status, body) = post(&app.router, "/api/transactions", checkout_body(&app, 500)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["medication"]["stockQuantity"], 0);
}

#[tokio::test]
async fn return_increments_stock() {
    let app = test_app().await;
    let mut body = checkout_body(&app, 25);
    body["type"] = json!("RETURN");
    let (status, body) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["medication"]["stockQuantity"], 525);
}

#[tokio::test]
async fn waste_requires_notes_and_leaves_stock_untouched() {
    let app = test_app().await;

    let mut body = checkout_body(&app, 10);
    body["type"] = json!("WASTE");
    let (status, err) = post(&app.router, "/api/transactions", body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");
    assert_eq!(err["details"][0]["path"], "notes");
    assert_eq!(
        err["details"][0]["message"],
        "Notes are required for WASTE transactions"
    );

    body["notes"] = json!("Contaminated vial");
    let (status, ok) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ok["data"]["medication"]["stockQuantity"], 500);
}

#[tokio::test]
async fn nurse_cannot_witness_own_transaction() {
    let app = test_app().await;
    let mut body = checkout_body(&app, 10);
    body["witnessId"] = json!(app.nurse_id);

    let (status, err) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"][0]["path"], "witnessId");
    assert_eq!(
        err["details"][0]["message"],
        "Witness must be a different person than the nurse"
    );
}

#[tokio::test]
async fn validation_reports_all_field_errors_at_once() {
    let app = test_app().await;
    let (status, err) = post(
        &app.router,
        "/api/transactions",
        json!({ "type": "BORROW", "quantity": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");
    let paths: Vec<&str> = err["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    for expected in ["medicationId", "nurseId", "witnessId", "type", "quantity"] {
        assert!(paths.contains(&expected), "missing path {expected}");
    }
}

#[tokio::test]
async fn unknown_entities_return_404() {
    let app = test_app().await;
    let ghost = "00000000-0000-4000-8000-00000000dead";

    let mut body = checkout_body(&app, 10);
    body["medicationId"] = json!(ghost);
    let (status, err) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Medication not found");

    let mut body = checkout_body(&app, 10);
    body["nurseId"] = json!(ghost);
    let (status, err) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Nurse not found");

    let mut body = checkout_body(&app, 10);
    body["witnessId"] = json!(ghost);
    let (status, err) = post(&app.router, "/api/transactions", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Witness not found");
}

#[tokio::test]
async fn transaction_list_filters_by_type() {
    let app = test_app().await;
    post(&app.router, "/api/transactions", checkout_body(&app, 10)).await;
    post(&app.router, "/api/transactions", checkout_body(&app, 20)).await;
    let mut ret = checkout_body(&app, 5);
    ret["type"] = json!("RETURN");
    post(&app.router, "/api/transactions", ret).await;

    let (status, body) = get(&app.router, "/api/transactions?type=CHECKOUT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, err) = get(&app.router, "/api/transactions?type=BORROW").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");
}

// =============================================================================
// Medications
// =============================================================================

#[tokio::test]
async fn create_and_list_medications() {
    let app = test_app().await;

    let (status, body) = post(
        &app.router,
        "/api/medications",
        json!({
            "name": "Fentanyl",
            "schedule": "II",
            "unit": "mcg",
            "slug": "fentanyl",
            "stockQuantity": 1000,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "fentanyl");
    assert_eq!(body["data"]["stockQuantity"], 1000);

    // Name-ascending order: Fentanyl before Morphine Sulfate
    let (status, body) = get(&app.router, "/api/medications").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Fentanyl");
    assert_eq!(body["data"][1]["name"], "Morphine Sulfate");
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn duplicate_slug_rejected() {
    let app = test_app().await;
    let (status, _) = post(
        &app.router,
        "/api/medications",
        json!({
            "name": "Morphine Sulfate ER",
            "schedule": "II",
            "unit": "mg",
            "slug": "morphine-sulfate",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn medication_create_validation_reports_every_field() {
    let app = test_app().await;
    let (status, err) = post(&app.router, "/api/medications", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths: Vec<&str> = err["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    for expected in ["name", "schedule", "unit", "slug"] {
        assert!(paths.contains(&expected), "missing path {expected}");
    }
}

#[tokio::test]
async fn medication_detail_includes_history_newest_first() {
    let app = test_app().await;
    post(&app.router, "/api/transactions", checkout_body(&app, 10)).await;
    let mut waste = checkout_body(&app, 2);
    waste["type"] = json!("WASTE");
    waste["notes"] = json!("Dropped on floor");
    post(&app.router, "/api/transactions", waste).await;

    let (status, body) = get(&app.router, "/api/medications/morphine-sulfate").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["slug"], "morphine-sulfate");
    assert_eq!(data["stockQuantity"], 490);

    let transactions = data["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["type"], "WASTE");
    assert_eq!(transactions[1]["type"], "CHECKOUT");
    assert_eq!(transactions[0]["nurse"]["name"], "Jane Smith");
}

#[tokio::test]
async fn unknown_slug_returns_404() {
    let app = test_app().await;
    let (status, err) = get(&app.router, "/api/medications/oxycodone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Medication not found");
}

#[tokio::test]
async fn schedule_filter_and_pagination_envelope() {
    let app = test_app().await;
    for (name, slug) in [("Diazepam", "diazepam"), ("Lorazepam", "lorazepam")] {
        post(
            &app.router,
            "/api/medications",
            json!({
                "name": name,
                "schedule": "IV",
                "unit": "mg",
                "slug": slug,
                "stockQuantity": 100,
            }),
        )
        .await;
    }

    let (status, body) = get(&app.router, "/api/medications?schedule=IV&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["limit"], 1);
}

// =============================================================================
// Pagination validation
// =============================================================================

#[tokio::test]
async fn pagination_bounds_enforced() {
    let app = test_app().await;

    let (status, err) = get(&app.router, "/api/medications?limit=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"][0]["message"], "Limit cannot exceed 100");

    let (status, err) = get(&app.router, "/api/medications?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"][0]["message"], "Page must be a positive integer");

    let (status, _) = get(&app.router, "/api/medications?limit=100").await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Audit log
// =============================================================================

#[tokio::test]
async fn audit_log_records_transaction_snapshot() {
    let app = test_app().await;
    let (_, created) = post(&app.router, "/api/transactions", checkout_body(&app, 50)).await;
    let transaction_id = created["data"]["id"].as_str().unwrap();

    let (status, body) = get(&app.router, "/api/audit-log").await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body["data"][0];
    assert_eq!(entry["action"], "TRANSACTION_CHECKOUT");
    assert_eq!(entry["entityType"], "Transaction");
    assert_eq!(entry["entityId"], transaction_id);
    assert_eq!(entry["performedBy"]["name"], "Jane Smith");
    assert_eq!(entry["details"]["medicationName"], "Morphine Sulfate");
    assert_eq!(entry["details"]["unit"], "mg");
    assert_eq!(entry["details"]["quantity"], 50);

    let (_, filtered) = get(&app.router, "/api/audit-log?entityType=Transaction").await;
    assert_eq!(filtered["pagination"]["total"], 1);
    let (_, other) = get(&app.router, "/api/audit-log?entityType=User").await;
    assert_eq!(other["pagination"]["total"], 0);
}
