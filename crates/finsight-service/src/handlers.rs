//! Request handlers for the three gateway endpoints.
//!
//! Each handler validates its payload before any external call, then maps
//! core results onto the JSON wire shapes. Batch policy for fraud
//! detection: the whole batch fails on the first bad transaction, and the
//! error names the offending text.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use finsight_provider::Embedding;

use crate::anomaly;
use crate::error::ApiError;
use crate::state::AppState;

const NEWS_PROMPT: &str =
    "You are a financial analyst. Analyze the following news item: summarize it, \
     assess market sentiment, and note likely sector impact.";

const CHATBOT_PROMPT: &str =
    "You are a helpful financial assistant. Answer the user's question clearly \
     and concisely.";

#[derive(Debug, Deserialize)]
pub struct AnalyzeNewsRequest {
    #[serde(default)]
    pub news_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeNewsResponse {
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
pub struct DetectFraudRequest {
    #[serde(default)]
    pub transactions: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DetectFraudResponse {
    /// Flagged transaction texts
    pub anomalies: Vec<String>,
    /// Their positions in the submitted batch
    pub indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached_embeddings: u64,
    pub index_vectors: usize,
    pub dimension: usize,
    /// On-disk index size; 0 until the first save
    pub index_size_bytes: u64,
}

/// Extract a required non-empty string field or fail with a `400`.
fn require_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::bad_request(format!("{} is required", field))),
    }
}

/// POST /analyze_news
pub async fn analyze_news(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeNewsRequest>,
) -> Result<Json<AnalyzeNewsResponse>, ApiError> {
    let news_text = require_text(request.news_text, "news_text")?;

    info!(chars = news_text.len(), "Analyzing financial news");
    let analysis = state.provider.complete(NEWS_PROMPT, &news_text).await?;

    Ok(Json(AnalyzeNewsResponse { analysis }))
}

/// POST /detect_fraud
pub async fn detect_fraud(
    State(state): State<AppState>,
    Json(request): Json<DetectFraudRequest>,
) -> Result<Json<DetectFraudResponse>, ApiError> {
    let transactions = match request.transactions {
        Some(txs) if !txs.is_empty() => txs,
        _ => return Err(ApiError::bad_request("transactions are required")),
    };

    info!(count = transactions.len(), "Running fraud detection batch");

    let mut embeddings: Vec<Embedding> = Vec::with_capacity(transactions.len());
    for tx in &transactions {
        let embedding = state.cache.get_or_create(tx).await.map_err(|e| {
            warn!(transaction = %tx, error = %e, "Fraud batch aborted");
            let api: ApiError = e.into();
            ApiError {
                status: api.status,
                message: format!("transaction {:?}: {}", tx, api.message),
            }
        })?;
        embeddings.push(embedding);
    }

    let indices = anomaly::flag_outliers(&embeddings);
    let anomalies = indices
        .iter()
        .map(|&i| transactions[i].clone())
        .collect();

    Ok(Json(DetectFraudResponse { anomalies, indices }))
}

/// POST /chatbot
pub async fn chatbot(
    State(state): State<AppState>,
    Json(request): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>, ApiError> {
    let query = require_text(request.query, "query")?;

    let response = state.provider.complete(CHATBOT_PROMPT, &query).await?;

    Ok(Json(ChatbotResponse { response }))
}

/// GET /healthz
pub async fn healthz(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let cached_embeddings = state.cache.len().map_err(|e| ApiError::internal(e.to_string()))?;
    let stats = state.index.read().await.stats();

    Ok(Json(HealthResponse {
        status: "ok",
        cached_embeddings,
        index_vectors: stats.vector_count,
        dimension: stats.dimension,
        index_size_bytes: stats.size_bytes,
    }))
}
