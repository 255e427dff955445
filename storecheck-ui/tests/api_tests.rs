//! Integration tests for storecheck-ui API endpoints
//!
//! Tests cover the inspection session flow, submission, the admin taxonomy
//! and issue endpoints, and the authentication middleware. Each test runs
//! against a fresh seeded database in a temp directory.
//!
//! Authentication testing is simplified by constructing state with
//! shared_secret=0, which disables auth checking; one test exercises the
//! enabled path with real headers.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use storecheck_common::api::auth::admin_token;
use storecheck_common::db::{init_database, SqliteProvider};
use storecheck_common::session::InspectionSession;
use storecheck_common::store::MemoryStore;
use storecheck_ui::{build_router, AppState};

/// Test helper: fresh app over a seeded temp database
async fn setup_app_with_secret(shared_secret: i64) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("storecheck.db"))
        .await
        .expect("database should initialize");
    let provider = SqliteProvider::new(pool.clone());

    let mut session = InspectionSession::new(Box::new(MemoryStore::new()));
    session
        .initialize(&provider)
        .await
        .expect("session should initialize from seeded taxonomy");

    let state = AppState::new(pool, provider, session, shared_secret);
    (build_router(state), dir)
}

async fn setup_app() -> (Router, TempDir) {
    setup_app_with_secret(0).await
}

/// Test helper: request with no body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: send a request and return (status, body)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = extract_json(response.into_body()).await;
    (status, body)
}

/// Answer every seeded item; the very first item is flagged "no"
async fn answer_everything(app: &Router) {
    let (_, session) = send(app, test_request("GET", "/api/session")).await;
    let mut first = true;
    for category in session["categories"].as_array().unwrap() {
        let category_id = category["id"].as_str().unwrap();
        for item in category["items"].as_array().unwrap() {
            let item_id = item["id"].as_str().unwrap();
            let body = if first {
                first = false;
                json!({"status": "no", "notes": "walk-in door seal torn", "fixed": false})
            } else {
                json!({"status": "yes"})
            };
            let uri = format!("/api/session/categories/{}/items/{}", category_id, item_id);
            let (status, _) = send(app, json_request("PUT", &uri, &body)).await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}

async fn set_store_info(app: &Router) {
    let (status, body) = send(
        app,
        json_request(
            "PUT",
            "/api/session/store-info",
            &json!({"store_number": "1234567", "inspected_by": "Jane"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "storecheck-ui");
    assert!(body["version"].is_string());
}

// =============================================================================
// Session Flow Tests
// =============================================================================

#[tokio::test]
async fn test_session_starts_ready_with_seeded_taxonomy() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "ready");
    assert_eq!(body["store_info"]["store_number"], "");

    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[0]["id"], "food-prep");
    // Every seeded item starts unanswered
    for category in categories {
        for item in category["items"].as_array().unwrap() {
            assert!(item["status"].is_null());
            assert_eq!(item["fixed"], false);
            assert_eq!(item["notes"], "");
        }
    }
    assert_eq!(body["completion"]["completed_items"], 0);
    assert_eq!(body["completion"]["percent_complete"], 0);
}

#[tokio::test]
async fn test_store_info_round_trip() {
    let (app, _dir) = setup_app().await;

    set_store_info(&app).await;

    let (_, body) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(body["store_info"]["store_number"], "1234567");
    assert_eq!(body["store_info"]["inspected_by"], "Jane");
}

#[tokio::test]
async fn test_update_item_moves_completion() {
    let (app, _dir) = setup_app().await;

    let (_, session) = send(&app, test_request("GET", "/api/session")).await;
    let total = session["completion"]["total_items"].as_i64().unwrap();
    let item_id = session["categories"][0]["items"][0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/session/categories/food-prep/items/{}", item_id);
    let (status, body) = send(&app, json_request("PUT", &uri, &json!({"status": "yes"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion"]["completed_items"], 1);
    assert_eq!(body["completion"]["total_items"], total);
    assert_eq!(body["category_complete"], false);
}

#[tokio::test]
async fn test_update_unknown_item_is_404() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/session/categories/food-prep/items/no-such-item",
            &json!({"status": "yes"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-item"));

    // State untouched
    let (_, session) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(session["completion"]["completed_items"], 0);
}

#[tokio::test]
async fn test_session_issues_lists_no_answers() {
    let (app, _dir) = setup_app().await;

    let (_, session) = send(&app, test_request("GET", "/api/session")).await;
    let item_id = session["categories"][0]["items"][1]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/session/categories/food-prep/items/{}", item_id);
    send(
        &app,
        json_request("PUT", &uri, &json!({"status": "no", "notes": "dirty"})),
    )
    .await;

    let (status, issues) = send(&app, test_request("GET", "/api/session/issues")).await;
    assert_eq!(status, StatusCode::OK);
    let issues = issues.as_array().unwrap().clone();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["item_id"], item_id.as_str());
    assert_eq!(issues[0]["category_title"], "Food Prep");
    assert_eq!(issues[0]["notes"], "dirty");
}

#[tokio::test]
async fn test_reset_discards_progress() {
    let (app, _dir) = setup_app().await;

    set_store_info(&app).await;
    answer_everything(&app).await;

    let (status, body) = send(&app, test_request("POST", "/api/session/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reset");
    assert_eq!(body["completion"]["completed_items"], 0);

    let (_, session) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(session["store_info"]["store_number"], "");
    assert_eq!(session["completion"]["percent_complete"], 0);
}

// =============================================================================
// Submission Tests
// =============================================================================

#[tokio::test]
async fn test_submit_rejects_missing_store_number() {
    let (app, _dir) = setup_app().await;

    let (_, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/session/store-info",
            &json!({"store_number": "", "inspected_by": "Jane"}),
        ),
    )
    .await;
    assert_eq!(body["ready"], false);
    answer_everything(&app).await;

    let (status, body) = send(&app, test_request("POST", "/api/session/submit")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("store_number"));

    // Nothing was written
    let (_, inspections) = send(&app, test_request("GET", "/api/admin/inspections")).await;
    assert_eq!(inspections.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submit_rejects_unanswered_items() {
    let (app, _dir) = setup_app().await;

    set_store_info(&app).await;

    let (status, body) = send(&app, test_request("POST", "/api/session/submit")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unanswered"));
}

#[tokio::test]
async fn test_full_submission_flow() {
    let (app, _dir) = setup_app().await;

    set_store_info(&app).await;
    answer_everything(&app).await;

    let (_, completion) = send(&app, test_request("GET", "/api/session/completion")).await;
    assert_eq!(completion["percent_complete"], 100);

    let (status, body) = send(&app, test_request("POST", "/api/session/submit")).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    // Confirmation view is keyed by the returned id
    let (status, record) =
        send(&app, test_request("GET", &format!("/api/inspections/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["store_number"], "1234567");
    assert_eq!(record["inspected_by"], "Jane");
    assert!(!record["client_date"].as_str().unwrap().is_empty());
    // Snapshot copies descriptions into the record
    assert_eq!(record["categories"][0]["id"], "food-prep");
    assert!(record["categories"][0]["items"][0]["description"].is_string());

    // Successful submission destroys the working state
    let (_, session) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(session["phase"], "ready");
    assert_eq!(session["store_info"]["store_number"], "");
    assert_eq!(session["completion"]["completed_items"], 0);
}

#[tokio::test]
async fn test_unknown_inspection_is_404() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api/inspections/no-such-id")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-id"));
}

// =============================================================================
// Admin Dashboard Tests
// =============================================================================

#[tokio::test]
async fn test_admin_issue_flow() {
    let (app, _dir) = setup_app().await;

    set_store_info(&app).await;
    answer_everything(&app).await;
    let (_, body) = send(&app, test_request("POST", "/api/session/submit")).await;
    let inspection_id = body["id"].as_str().unwrap().to_string();

    // The one "no" answer shows up as an issue
    let (status, body) = send(&app, test_request("GET", "/api/admin/issues")).await;
    assert_eq!(status, StatusCode::OK);
    let issues = body["issues"].as_array().unwrap().clone();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["inspection_id"], inspection_id.as_str());
    assert_eq!(issues[0]["fixed"], false);
    let category_id = issues[0]["category_id"].as_str().unwrap().to_string();
    let item_id = issues[0]["item_id"].as_str().unwrap().to_string();

    // Flip it to fixed
    let (status, record) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/issues/status",
            &json!({
                "inspection_id": inspection_id,
                "category_id": category_id,
                "item_id": item_id,
                "fixed": true,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["version"], 2);

    let (_, body) = send(&app, test_request("GET", "/api/admin/issues")).await;
    assert_eq!(body["issues"][0]["fixed"], true);

    // Unknown item is a specific 404
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/issues/status",
            &json!({
                "inspection_id": inspection_id,
                "category_id": category_id,
                "item_id": "no-such-item",
                "fixed": true,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_inspections_listing_respects_limit() {
    let (app, _dir) = setup_app().await;

    for _ in 0..2 {
        set_store_info(&app).await;
        answer_everything(&app).await;
        let (status, _) = send(&app, test_request("POST", "/api/session/submit")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, test_request("GET", "/api/admin/inspections")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, test_request("GET", "/api/admin/inspections?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Admin Taxonomy Tests
// =============================================================================

#[tokio::test]
async fn test_admin_taxonomy_crud() {
    let (app, _dir) = setup_app().await;

    // Create
    let (status, category) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/categories",
            &json!({"title": "Back Office", "icon": "boxes"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["id"], "back-office");
    assert_eq!(category["sort_order"], 5);

    // Duplicate slug rejected
    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/categories", &json!({"title": "Back office!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Add an item
    let (status, item) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/categories/back-office/items",
            &json!({"description": "Safe counted and logged"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = item["id"].as_str().unwrap().to_string();
    assert_eq!(item["sort_order"], 0);

    // Rename the item
    let (status, item) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admin/items/{}", item_id),
            &json!({"description": "Safe counted, logged, and locked"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["description"], "Safe counted, logged, and locked");

    // Update the category
    let (status, category) = send(
        &app,
        json_request(
            "PUT",
            "/api/admin/categories/back-office",
            &json!({"title": "Office"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["id"], "back-office");
    assert_eq!(category["title"], "Office");

    // Delete cascades
    let (status, _) = send(&app, test_request("DELETE", "/api/admin/categories/back-office")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        test_request("DELETE", &format!("/api/admin/items/{}", item_id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, categories) = send(&app, test_request("GET", "/api/admin/categories")).await;
    assert_eq!(categories.as_array().unwrap().len(), 5);
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_auth_when_secret_set() {
    let (app, _dir) = setup_app_with_secret(987654321).await;

    // No headers: 401
    let (status, body) = send(&app, test_request("GET", "/api/admin/categories")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-storecheck-timestamp"));

    // Bad token: 401
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    let request = Request::builder()
        .method("GET")
        .uri("/api/admin/categories")
        .header("x-storecheck-timestamp", now.to_string())
        .header("x-storecheck-token", "bogus")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid headers: 200
    let request = Request::builder()
        .method("GET")
        .uri("/api/admin/categories")
        .header("x-storecheck-timestamp", now.to_string())
        .header("x-storecheck-token", admin_token(now, 987654321))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    // The inspection flow stays open
    let (status, _) = send(&app, test_request("GET", "/api/session")).await;
    assert_eq!(status, StatusCode::OK);
}
