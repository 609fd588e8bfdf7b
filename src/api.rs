use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::cluster::ClusterPresentation;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{ChatMessage, ClusterId, ClusterSeed};
use crate::registry::{TopicPresentation, TopicRegistry};
use crate::sentiment::{ScoredText, SentimentLabel, SentimentScorer, SentimentStats};
use crate::topic::AssignOutcome;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TopicRegistry>,
    pub scorer: Arc<SentimentScorer>,
}

impl AppState {
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            registry: Arc::new(TopicRegistry::new(cfg)),
            scorer: Arc::new(SentimentScorer::new()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/sentiment", post(score_sentiment))
        .route("/sentiment/batch", post(score_sentiment_batch))
        .route("/topics/{topic_id}", delete(remove_topic))
        .route(
            "/topics/{topic_id}/clusters",
            put(reseed).get(topic_presentation),
        )
        .route(
            "/topics/{topic_id}/clusters/{cluster_id}",
            get(cluster_presentation),
        )
        .route(
            "/topics/{topic_id}/messages",
            post(assign_message).get(recent_messages),
        )
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Router with a fresh in-memory registry.
pub fn router(cfg: EngineConfig) -> Router {
    create_router(AppState::new(cfg))
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::TopicNotFound(_) | EngineError::ClusterNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            EngineError::DuplicateClusterId(_) | EngineError::ClusterIdReused(_) => {
                StatusCode::CONFLICT
            }
            EngineError::MessageTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        };
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct SentimentReq {
    text: String,
}

#[derive(Serialize)]
struct SentimentResp {
    score: f64,
    label: SentimentLabel,
}

async fn score_sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentReq>,
) -> Json<SentimentResp> {
    let score = state.scorer.score(&body.text);
    Json(SentimentResp {
        score,
        label: SentimentLabel::from_score(score),
    })
}

#[derive(Serialize)]
struct BatchResp {
    items: Vec<ScoredText>,
    stats: SentimentStats,
}

async fn score_sentiment_batch(
    State(state): State<AppState>,
    Json(texts): Json<Vec<String>>,
) -> Json<BatchResp> {
    let items = state.scorer.score_batch(&texts);
    let stats = SentimentStats::from_scored(&items);
    Json(BatchResp { items, stats })
}

async fn reseed(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    Json(seeds): Json<Vec<ClusterSeed>>,
) -> Result<StatusCode, EngineError> {
    state.registry.reseed(&topic_id, seeds)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn topic_presentation(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<TopicPresentation>, EngineError> {
    state.registry.topic_presentation(&topic_id).map(Json)
}

async fn cluster_presentation(
    State(state): State<AppState>,
    Path((topic_id, cluster_id)): Path<(String, ClusterId)>,
) -> Result<Json<ClusterPresentation>, EngineError> {
    state
        .registry
        .cluster_presentation(&topic_id, cluster_id)
        .map(Json)
}

#[derive(Deserialize)]
struct AssignReq {
    text: String,
    author: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>, // if absent, "now"
}

async fn assign_message(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    Json(body): Json<AssignReq>,
) -> Result<Json<AssignOutcome>, EngineError> {
    state
        .registry
        .assign_message(&topic_id, &body.text, &body.author, body.timestamp)
        .map(Json)
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn recent_messages(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, EngineError> {
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    state.registry.recent_messages(&topic_id, limit).map(Json)
}

async fn remove_topic(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<StatusCode, EngineError> {
    state.registry.remove_topic(&topic_id)?;
    Ok(StatusCode::NO_CONTENT)
}
