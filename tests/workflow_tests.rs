//! End-to-end tests driving the order workflow over HTTP
//!
//! These tests verify the complete flow from login through order intake and
//! distribution to the printable summary.

use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::{TestRequest, TestServer};
use nursery::prelude::*;
use nursery::storage::digest_secret;
use serde_json::{Value, json};

const EMAIL: &str = "grower@nursery.example";
const PASSWORD: &str = "s3cret";

// =============================================================================
// Helpers
// =============================================================================

fn create_test_server() -> TestServer {
    let users = StaticCredentialStore::new(vec![UserRecord {
        email: EMAIL.to_string(),
        password_sha256: digest_secret(PASSWORD),
    }])
    .expect("valid user store");

    let config = AppConfig {
        login_delay_ms: 0,
        max_boxes: 10,
        max_distribution_entries: 3,
        ..AppConfig::default()
    };

    let app = ServerBuilder::new()
        .with_config(config)
        .with_credential_verifier(users)
        .build()
        .expect("Failed to build app");

    TestServer::new(app).expect("Failed to create test server")
}

fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

async fn login(server: &TestServer) -> String {
    let response = server
        .post("/auth/login")
        .json(&json!({ "email": EMAIL, "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

/// Fill in the order form with one box per quantity
async fn fill_order(server: &TestServer, token: &str, quantities: &[u32]) {
    bearer(server.put("/session/order"), token)
        .json(&json!({
            "order_number": "PED-0042",
            "date": "2025-03-14",
            "description": "Pistachio rootstock"
        }))
        .await
        .assert_status_ok();

    bearer(server.put("/session/order/box-count"), token)
        .json(&json!({ "count": quantities.len() }))
        .await
        .assert_status_ok();

    for (i, quantity) in quantities.iter().enumerate() {
        bearer(server.put(&format!("/session/order/boxes/{}", i)), token)
            .json(&json!({
                "box_number": format!("C-{}", i + 1),
                "variety": "UCB-1",
                "plant_quantity": quantity
            }))
            .await
            .assert_status_ok();
    }
}

async fn put_entry(server: &TestServer, token: &str, index: usize, lot: &str, quantity: u32) {
    bearer(
        server.put(&format!("/session/distribution/entries/{}", index)),
        token,
    )
    .json(&json!({
        "zone": "Norte",
        "arch": "A1",
        "row": "F3",
        "lot": lot,
        "plant_quantity": quantity
    }))
    .await
    .assert_status_ok();
}

async fn add_entry(server: &TestServer, token: &str) {
    bearer(server.post("/session/distribution/entries"), token)
        .await
        .assert_status_ok();
}

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = create_test_server();

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "nursery-orders");
        }
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_opens_session_at_order_stage() {
        let server = create_test_server();
        let token = login(&server).await;

        let response = bearer(server.get("/session"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["stage"], "order");
        assert_eq!(body["order_draft"]["boxes"], json!([]));
        assert_eq!(body["order_draft_total_plants"], 0);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected_generically() {
        let server = create_test_server();

        let response = server
            .post("/auth/login")
            .json(&json!({ "email": EMAIL, "password": "wrong" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
        assert_eq!(body["message"], "Invalid credentials. Please try again.");

        let response = server
            .post("/auth/login")
            .json(&json!({ "email": "nobody@nursery.example", "password": PASSWORD }))
            .await;
        let other: Value = response.json();
        assert_eq!(other["message"], body["message"]);
    }

    #[tokio::test]
    async fn test_login_is_case_sensitive() {
        let server = create_test_server();

        let response = server
            .post("/auth/login")
            .json(&json!({ "email": EMAIL.to_uppercase(), "password": PASSWORD }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_body_is_validated() {
        let server = create_test_server();

        let response = server
            .post("/auth/login")
            .json(&json!({ "email": "not-an-email", "password": PASSWORD }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_INPUT");

        let response = server
            .post("/auth/login")
            .json(&json!({ "email": EMAIL, "password": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_token() {
        let server = create_test_server();

        let response = server.get("/session").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_TOKEN");

        let response = bearer(server.get("/session"), "not-a-uuid").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_TOKEN");

        let response = bearer(server.get("/session"), &Uuid::new_v4().to_string()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_logout_closes_session() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[5]).await;

        bearer(server.post("/auth/logout"), &token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        bearer(server.get("/session"), &token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let store = InMemorySessionStore::new();
        let users = StaticCredentialStore::new(vec![UserRecord {
            email: EMAIL.to_string(),
            password_sha256: digest_secret(PASSWORD),
        }])
        .unwrap();
        let config = AppConfig {
            login_delay_ms: 0,
            session_idle_timeout_secs: 60,
            ..AppConfig::default()
        };
        let app = ServerBuilder::new()
            .with_config(config)
            .with_session_store(store.clone())
            .with_credential_verifier(users)
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        let abandoned = login(&server).await;
        let token: Uuid = abandoned.parse().unwrap();
        let mut record = store.get(&token).await.unwrap().unwrap();
        record.updated_at = Utc::now() - chrono::Duration::minutes(5);
        store.update(&token, record).await.unwrap();

        // A later login sweeps the abandoned session
        let active = login(&server).await;
        assert_eq!(store.count().await.unwrap(), 1);

        let response = bearer(server.get("/session"), &abandoned).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["code"], "SESSION_NOT_FOUND");

        bearer(server.get("/session"), &active)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_deny_all_without_user_store() {
        let config = AppConfig {
            login_delay_ms: 0,
            ..AppConfig::default()
        };
        let app = ServerBuilder::new().with_config(config).build().unwrap();
        let server = TestServer::new(app).unwrap();

        server
            .post("/auth/login")
            .json(&json!({ "email": EMAIL, "password": PASSWORD }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Order Intake Tests
// =============================================================================

mod order_tests {
    use super::*;

    #[tokio::test]
    async fn test_box_count_resizes_the_table() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[10, 5, 7]).await;

        let body: Value = bearer(server.get("/session"), &token).await.json();
        assert_eq!(body["order_draft"]["boxes"].as_array().unwrap().len(), 3);
        assert_eq!(body["order_draft_total_plants"], 22);

        // Shrinking keeps the leading rows
        let response = bearer(server.put("/session/order/box-count"), &token)
            .json(&json!({ "count": 2 }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["order_draft"]["boxes"].as_array().unwrap().len(), 2);
        assert_eq!(body["order_draft"]["boxes"][1]["plant_quantity"], 5);
        assert_eq!(body["order_draft_total_plants"], 15);
    }

    #[tokio::test]
    async fn test_box_count_limit() {
        let server = create_test_server();
        let token = login(&server).await;

        let response = bearer(server.put("/session/order/box-count"), &token)
            .json(&json!({ "count": 11 }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "QUANTITY_CONSTRAINT");
    }

    #[tokio::test]
    async fn test_negative_quantity_is_a_bad_body() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[1]).await;

        let response = bearer(server.put("/session/order/boxes/0"), &token)
            .json(&json!({
                "box_number": "C-1",
                "variety": "UCB-1",
                "plant_quantity": -3
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_box_index_out_of_range() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[1, 2]).await;

        let response = bearer(server.put("/session/order/boxes/5"), &token)
            .json(&json!({ "box_number": "X", "variety": "Y", "plant_quantity": 1 }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "INDEX_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_remove_box() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[4, 6]).await;

        let body: Value = bearer(server.delete("/session/order/boxes/0"), &token)
            .await
            .json();
        let boxes = body["order_draft"]["boxes"].as_array().unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0]["plant_quantity"], 6);
    }

    #[tokio::test]
    async fn test_submit_with_missing_field_names_it() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[10, 0]).await;

        let response = bearer(server.post("/session/order/submit"), &token).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_FIELD");
        assert_eq!(body["details"]["field"], "plant_quantity");
        assert_eq!(body["details"]["index"], 1);

        // Nothing was committed
        let body: Value = bearer(server.get("/session"), &token).await.json();
        assert_eq!(body["stage"], "order");
        assert!(body.get("order").is_none());
    }

    #[tokio::test]
    async fn test_submit_without_boxes_fails() {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, &[]).await;

        let response = bearer(server.post("/session/order/submit"), &token).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["details"]["field"], "box_count");
    }
}

// =============================================================================
// Distribution Tests
// =============================================================================

mod distribution_tests {
    use super::*;

    async fn at_distribution(quantities: &[u32]) -> (TestServer, String) {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, quantities).await;
        bearer(server.post("/session/order/submit"), &token)
            .await
            .assert_status_ok();
        (server, token)
    }

    #[tokio::test]
    async fn test_submit_order_opens_distribution() {
        let (server, token) = at_distribution(&[60, 40]).await;

        let response = bearer(server.get("/session/distribution"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
        assert_eq!(body["status"]["order_total"], 100);
        assert_eq!(body["status"]["distributed"], 0);
        assert_eq!(body["status"]["remaining"], 100);
    }

    #[tokio::test]
    async fn test_live_totals_and_lot_grouping() {
        let (server, token) = at_distribution(&[10]).await;
        put_entry(&server, &token, 0, "A", 5).await;
        add_entry(&server, &token).await;
        put_entry(&server, &token, 1, "B", 3).await;
        add_entry(&server, &token).await;
        put_entry(&server, &token, 2, "A", 2).await;

        let body: Value = bearer(server.get("/session/distribution"), &token)
            .await
            .json();
        assert_eq!(body["status"]["distributed"], 10);
        assert_eq!(body["status"]["remaining"], 0);
        assert_eq!(body["status"]["lot_totals"], json!({ "A": 7, "B": 3 }));
    }

    #[tokio::test]
    async fn test_over_allocation_shows_negative_remaining_and_blocks_submit() {
        let (server, token) = at_distribution(&[10]).await;
        put_entry(&server, &token, 0, "A", 12).await;

        let body: Value = bearer(server.get("/session/distribution"), &token)
            .await
            .json();
        assert_eq!(body["status"]["remaining"], -2);

        let response = bearer(server.post("/session/distribution/submit"), &token).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "QUANTITY_CONSTRAINT");
        assert_eq!(body["details"], json!({ "distributed": 12, "total": 10 }));
    }

    #[tokio::test]
    async fn test_removing_last_entry_is_a_no_op() {
        let (server, token) = at_distribution(&[10]).await;

        let response = bearer(server.delete("/session/distribution/entries/0"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["distribution"]["entries"].as_array().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_entry_limit() {
        let (server, token) = at_distribution(&[10]).await;
        add_entry(&server, &token).await;
        add_entry(&server, &token).await;

        let response = bearer(server.post("/session/distribution/entries"), &token).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_back_keeps_order_form() {
        let (server, token) = at_distribution(&[10, 5]).await;

        let response = bearer(server.post("/session/distribution/back"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["stage"], "order");
        assert_eq!(body["order_draft"]["order_number"], "PED-0042");
        assert_eq!(body["order_draft"]["boxes"].as_array().unwrap().len(), 2);

        // The distribution view is only available while distributing
        bearer(server.get("/session/distribution"), &token)
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_wrong_stage_is_a_conflict() {
        let server = create_test_server();
        let token = login(&server).await;

        let response = bearer(server.post("/session/distribution/submit"), &token).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "WRONG_STAGE");
        assert_eq!(body["details"]["expected"], "distribution");
        assert_eq!(body["details"]["actual"], "order");

        bearer(server.get("/session/summary"), &token)
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

// =============================================================================
// Summary Tests
// =============================================================================

mod summary_tests {
    use super::*;

    async fn at_summary(quantities: &[u32], allocations: &[(&str, u32)]) -> (TestServer, String) {
        let server = create_test_server();
        let token = login(&server).await;
        fill_order(&server, &token, quantities).await;
        bearer(server.post("/session/order/submit"), &token)
            .await
            .assert_status_ok();

        for (i, (lot, quantity)) in allocations.iter().enumerate() {
            if i > 0 {
                add_entry(&server, &token).await;
            }
            put_entry(&server, &token, i, lot, *quantity).await;
        }

        bearer(server.post("/session/distribution/submit"), &token)
            .await
            .assert_status_ok();
        (server, token)
    }

    #[tokio::test]
    async fn test_full_allocation_has_no_reconciliation() {
        let (server, token) = at_summary(&[10, 5, 7], &[("A", 12), ("B", 10)]).await;

        let response = bearer(server.get("/session/summary"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["order_number"], "PED-0042");
        assert_eq!(body["date"], "2025-03-14");
        assert_eq!(body["box_footer"], json!({ "declared_boxes": 3, "total_plants": 22 }));
        assert_eq!(body["total_distributed"], 22);
        assert_eq!(body["remaining"], 0);
        assert!(body.get("reconciliation").is_none());
    }

    #[tokio::test]
    async fn test_under_allocation_reports_reconciliation() {
        let (server, token) = at_summary(&[60, 40], &[("L1", 50), ("L2", 30)]).await;

        let body: Value = bearer(server.get("/session/summary"), &token)
            .await
            .json();
        assert_eq!(
            body["reconciliation"],
            json!({ "order_total": 100, "distributed": 80, "remaining": 20 })
        );
        assert_eq!(body["lot_totals"], json!({ "L1": 50, "L2": 30 }));
    }

    #[tokio::test]
    async fn test_print_snapshot() {
        let (server, token) = at_summary(&[8], &[("A", 8)]).await;

        let response = bearer(server.get("/session/print"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["title"], "Pedido - PED-0042");
        assert_eq!(body["page_size"], "A4");
        assert_eq!(body["summary"]["total_distributed"], 8);
        assert!(body["generated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_edits_rejected_at_summary() {
        let (server, token) = at_summary(&[8], &[("A", 8)]).await;

        bearer(server.post("/session/distribution/back"), &token)
            .await
            .assert_status(StatusCode::CONFLICT);
        bearer(server.put("/session/order/box-count"), &token)
            .json(&json!({ "count": 1 }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_reset_starts_a_new_order() {
        let (server, token) = at_summary(&[8], &[("A", 8)]).await;

        let response = bearer(server.post("/session/reset"), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["stage"], "order");
        assert_eq!(body["order_draft"]["order_number"], "");
        assert_eq!(body["order_draft"]["boxes"], json!([]));
        assert!(body.get("order").is_none());
        assert!(body.get("summary").is_none());

        bearer(server.get("/session/summary"), &token)
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
