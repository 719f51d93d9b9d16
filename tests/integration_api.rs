//! API Integration Tests

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;

mod common;

use common::{app, app_with_channel, get_wallet, held, post_json, send, FailingChannel};

#[tokio::test]
async fn test_health() {
    let (app, _rx) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_absent_wallet_reads_empty() {
    let (app, _rx) = app();

    let (status, body) = send(&app.router, get_wallet("1001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"userId": "1001", "balances": []}));

    // Read created the wallet
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_credit_then_overdraw_scenario() {
    let (app, mut rx) = app();

    // 1. Credit 10 USDT to an empty wallet
    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/credit", &json!({"userId": "1001", "asset": "USDT", "amount": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Credit failed: {}", body);
    assert_eq!(body["userId"], "1001");
    assert_eq!(body["balances"].as_array().unwrap().len(), 1);
    assert_eq!(body["balances"][0]["asset"], "USDT");
    assert_eq!(body["balances"][0]["amount"].as_f64(), Some(10.0));

    let (destination, text) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(destination, "1001");
    assert!(text.contains("Credited 10 USDT"));

    // 2. Debit 15 USDT is refused
    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/debit", &json!({"userId": "1001", "asset": "USDT", "amount": 15})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INSUFFICIENT_FUNDS");

    // 3. Balance unchanged
    let (status, body) = send(&app.router, get_wallet("1001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held(&body, "USDT"), 10.0);
}

#[tokio::test]
async fn test_debit_returns_updated_wallet() {
    let (app, _rx) = app();

    send(
        &app.router,
        post_json("/api/wallet/credit", &json!({"userId": "7", "asset": "TON", "amount": "2.5"})),
    )
    .await;

    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/debit", &json!({"userId": "7", "asset": "TON", "amount": 1.25})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held(&body, "TON"), 1.25);
}

#[tokio::test]
async fn test_debit_of_unknown_asset() {
    let (app, _rx) = app();

    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/debit", &json!({"userId": "7", "asset": "NOT", "amount": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INSUFFICIENT_FUNDS");
}

#[tokio::test]
async fn test_validation_rejects_without_touching_store() {
    let (app, _rx) = app();

    let bad_bodies = [
        json!({"userId": "7", "asset": "USDT", "amount": 0}),
        json!({"userId": "7", "asset": "USDT", "amount": -4}),
        json!({"userId": "7", "asset": "USDT", "amount": "lots"}),
        json!({"userId": "7", "asset": "USDT", "amount": "1_0"}),
        json!({"userId": "7", "asset": "USDT", "amount": 1e300}),
        json!({"userId": "7", "asset": "USDT"}),
        json!({"userId": "", "asset": "USDT", "amount": 1}),
        json!({"userId": "7", "asset": "", "amount": 1}),
    ];

    for path in ["/api/wallet/credit", "/api/wallet/debit"] {
        for body in &bad_bodies {
            let (status, response) = send(&app.router, post_json(path, body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} accepted {}", path, body);
            assert_eq!(response["error"], "VALIDATION_ERROR");
            assert!(response["field"].is_string());
        }
    }

    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_amount_field_named_in_error() {
    let (app, _rx) = app();

    let (_, response) = send(
        &app.router,
        post_json("/api/wallet/credit", &json!({"userId": "7", "asset": "USDT", "amount": "ten"})),
    )
    .await;
    assert_eq!(response["field"], "amount");
}

#[tokio::test]
async fn test_out_of_range_amount_reports_limit() {
    let (app, _rx) = app();

    let (status, response) = send(
        &app.router,
        post_json("/api/wallet/credit", &json!({"userId": "7", "asset": "USDT", "amount": 1e300})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "amount");
    assert!(response["message"].as_str().unwrap().contains("exceeds maximum"));
}

#[tokio::test]
async fn test_balance_may_grow_past_single_credit_limit() {
    let (app, _rx) = app();
    let body = json!({"userId": "1", "asset": "USDT", "amount": 1000000000000u64});

    for _ in 0..2 {
        let (status, response) = send(&app.router, post_json("/api/wallet/credit", &body)).await;
        assert_eq!(status, StatusCode::OK, "Credit failed: {}", response);
    }

    let (_, wallet) = send(&app.router, get_wallet("1")).await;
    assert_eq!(held(&wallet, "USDT"), 2e12);
}

#[tokio::test]
async fn test_malformed_json() {
    let (app, _rx) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/wallet/credit")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_JSON");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_missing_user_header() {
    let (app, _rx) = app();

    let request = Request::builder().uri("/api/wallet").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_HEADER");
}

#[tokio::test]
async fn test_correlation_id_echoed() {
    let (app, _rx) = app();
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let request = Request::builder()
        .uri("/api/wallet")
        .header("x-user-id", "7")
        .header("x-correlation-id", &correlation_id)
        .body(Body::empty())
        .unwrap();

    use tower::util::ServiceExt;
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap().to_str().unwrap(),
        correlation_id
    );
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_credit() {
    let app = app_with_channel(Arc::new(FailingChannel));

    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/credit", &json!({"userId": "7", "asset": "USDT", "amount": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held(&body, "USDT"), 3.0);

    let (status, body) = send(
        &app.router,
        post_json("/api/wallet/debit", &json!({"userId": "7", "asset": "USDT", "amount": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held(&body, "USDT"), 0.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_over_http() {
    let (app, _rx) = app();

    let a = {
        let router = app.router.clone();
        tokio::spawn(async move {
            send(
                &router,
                post_json("/api/wallet/credit", &json!({"userId": "9", "asset": "USDT", "amount": 10})),
            )
            .await
        })
    };
    let b = {
        let router = app.router.clone();
        tokio::spawn(async move {
            send(
                &router,
                post_json("/api/wallet/credit", &json!({"userId": "9", "asset": "USDT", "amount": 5})),
            )
            .await
        })
    };

    assert_eq!(a.await.unwrap().0, StatusCode::OK);
    assert_eq!(b.await.unwrap().0, StatusCode::OK);

    let (_, body) = send(&app.router, get_wallet("9")).await;
    assert_eq!(held(&body, "USDT"), 15.0);
}
