//! Integration tests for the finsight gateway.
//!
//! These tests stand up the real HTTP server over a mock provider and
//! exercise the endpoints end to end, including cache behavior across
//! requests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tokio::time::sleep;

use finsight_cache::{CacheStore, EmbeddingCache};
use finsight_provider::MockProvider;
use finsight_service::{run_server_with_shutdown, AppState};
use finsight_vector::TxnIndex;

const DIM: usize = 64;

/// Test harness that manages server lifecycle.
struct TestHarness {
    _temp_dir: TempDir,
    provider: Arc<MockProvider>,
    endpoint: String,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    _server_handle: tokio::task::JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>,
}

impl TestHarness {
    /// Create a new test harness with a running server.
    async fn new(port: u16) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let provider = Arc::new(MockProvider::new(DIM));

        let store = CacheStore::open_or_create(temp_dir.path().join("cache.db"), DIM)
            .expect("Failed to open cache store");
        let cache = Arc::new(EmbeddingCache::new(store, provider.clone()));
        let index = TxnIndex::load_or_create(temp_dir.path().join("txn.usearch"), DIM)
            .expect("Failed to create index");

        let state = AppState::new(cache, Arc::new(RwLock::new(index)), provider.clone());

        let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let server_handle = tokio::spawn(async move {
            run_server_with_shutdown(addr, state, async {
                shutdown_rx.await.ok();
            })
            .await
        });

        // Wait for server to start
        sleep(Duration::from_millis(200)).await;

        let endpoint = format!("http://127.0.0.1:{}", port);

        Self {
            _temp_dir: temp_dir,
            provider,
            endpoint,
            shutdown_tx: Some(shutdown_tx),
            _server_handle: server_handle,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}{}", self.endpoint, path))
            .json(&body)
            .send()
            .await
            .expect("Request failed");

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            tx.send(()).ok();
        }
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[tokio::test]
async fn test_chatbot_round_trip() {
    let harness = TestHarness::new(18751).await;

    let (status, body) = harness
        .post("/chatbot", json!({"query": "What is a bond?"}))
        .await;

    assert_eq!(status, 200);
    assert!(body["response"].as_str().unwrap().contains("What is a bond?"));
}

#[tokio::test]
async fn test_missing_fields_return_400() {
    let harness = TestHarness::new(18752).await;

    let (status, body) = harness.post("/analyze_news", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "news_text is required");

    let (status, _) = harness.post("/chatbot", json!({"query": ""})).await;
    assert_eq!(status, 400);

    let (status, _) = harness.post("/detect_fraud", json!({"transactions": []})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_fraud_detection_uses_cache_across_requests() {
    let harness = TestHarness::new(18753).await;

    let txs = json!({"transactions": [
        "Payment of $1000 to Vendor A",
        "Payment of $1200 to Vendor B",
        "Payment of $900 to Vendor C",
    ]});

    let (status, body) = harness.post("/detect_fraud", txs.clone()).await;
    assert_eq!(status, 200);
    assert!(body["anomalies"].is_array());
    assert_eq!(harness.provider.embed_calls(), 3);

    // Second identical batch is served entirely from the cache.
    let (status, _) = harness.post("/detect_fraud", txs).await;
    assert_eq!(status, 200);
    assert_eq!(harness.provider.embed_calls(), 3);

    // One new transaction costs exactly one provider call.
    let (status, _) = harness
        .post(
            "/detect_fraud",
            json!({"transactions": [
                "Payment of $1000 to Vendor A",
                "Refund of $50 from Vendor D",
            ]}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(harness.provider.embed_calls(), 4);
}

#[tokio::test]
async fn test_healthz_reports_cache_growth() {
    let harness = TestHarness::new(18754).await;

    let client = reqwest::Client::new();
    let before: Value = client
        .get(format!("{}/healthz", harness.endpoint))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before["status"], "ok");
    assert_eq!(before["cached_embeddings"], 0);
    assert_eq!(before["dimension"], DIM);

    harness
        .post(
            "/detect_fraud",
            json!({"transactions": ["a wire", "a check", "a deposit"]}),
        )
        .await;

    let after: Value = client
        .get(format!("{}/healthz", harness.endpoint))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["cached_embeddings"], 3);
}
