//! Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use marketplace_wallet::api::{self, AppState};
use marketplace_wallet::notify::{ChannelError, NotificationChannel, NotificationDispatcher};
use marketplace_wallet::store::{InMemoryWalletStore, WalletStore};
use marketplace_wallet::LedgerEngine;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

/// Channel that forwards every message to the test
pub struct RecordingChannel(mpsc::UnboundedSender<(String, String)>);

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send_message(&self, destination: &str, text: &str) -> Result<(), ChannelError> {
        let _ = self.0.send((destination.to_string(), text.to_string()));
        Ok(())
    }
}

/// Channel whose every delivery fails, like a bot that was never started by the user
pub struct FailingChannel;

#[async_trait]
impl NotificationChannel for FailingChannel {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn send_message(&self, destination: &str, _: &str) -> Result<(), ChannelError> {
        Err(ChannelError::Rejected {
            status: 400,
            description: format!("Bad Request: chat {} not found", destination),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryWalletStore>,
}

/// App over an in-memory store, with a channel of the caller's choosing
pub fn app_with_channel(channel: Arc<dyn NotificationChannel>) -> TestApp {
    let store = Arc::new(InMemoryWalletStore::new());
    let engine = LedgerEngine::new(
        store.clone() as Arc<dyn WalletStore>,
        NotificationDispatcher::new(channel),
    );

    TestApp {
        router: api::build_router(AppState::new(engine)),
        store,
    }
}

/// App plus the receiving end of its recorded notifications
pub fn app() -> (TestApp, mpsc::UnboundedReceiver<(String, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (app_with_channel(Arc::new(RecordingChannel(tx))), rx)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_wallet(user_id: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/api/wallet")
        .header("x-user-id", user_id)
        .body(Body::empty())
        .unwrap()
}

/// Run one request and decode the JSON response body
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

/// Amount held for `asset` in a wallet response, 0 if absent
pub fn held(wallet: &Value, asset: &str) -> f64 {
    wallet["balances"]
        .as_array()
        .and_then(|b| b.iter().find(|e| e["asset"] == asset))
        .and_then(|e| e["amount"].as_f64())
        .unwrap_or(0.0)
}
