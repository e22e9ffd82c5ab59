//! Request handlers for the question-answering API.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::embedding::query_embedding_or_zero;
use crate::store::ScoredChunk;

/// Longest source preview returned by `/query`.
const SOURCE_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub collection_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    pub sources: Vec<SourcePreview>,
    pub total_chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct SourcePreview {
    pub text: String,
    pub source_url: String,
    pub score: f32,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub source_chunks: Vec<String>,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "corpusmith is running",
        "status": "ok",
    }))
}

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let collections = state.store.list_collections().await?;
    Ok(Json(json!({
        "status": "healthy",
        "collections": collections,
    })))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = &state.config;
    Json(json!({
        "status": "operational",
        "environment_configured": config.is_fully_configured(),
        "has_embedding_key": config.has_embedding_key(),
        "has_vector_store_url": config.has_vector_store_url(),
        "has_vector_store_key": config.has_vector_store_key(),
    }))
}

pub async fn collections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let collections = state.store.list_collections().await?;
    Ok(Json(json!({ "collections": collections })))
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    let top_k = request.top_k.unwrap_or(state.config.top_k);
    if top_k == 0 {
        return Err(ApiError::BadRequest("top_k must be at least 1".to_string()));
    }

    let hits = retrieve(
        &state,
        request.collection_name.as_deref(),
        &request.query,
        top_k,
    )
    .await;
    let context: Vec<String> = hits.iter().map(|hit| hit.record.content.clone()).collect();
    let answer = state.responder.answer(&request.query, &context).await;

    let sources = hits
        .iter()
        .map(|hit| SourcePreview {
            text: preview(&hit.record.content, SOURCE_PREVIEW_CHARS),
            source_url: hit.record.source_url.clone(),
            score: hit.score,
        })
        .collect();

    Ok(Json(QueryResponse {
        query: request.query,
        response: answer,
        total_chunks: hits.len(),
        sources,
    }))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "question must not be empty".to_string(),
        ));
    }

    let hits = retrieve(&state, None, &request.question, state.config.ask_top_k).await;
    let source_chunks: Vec<String> = hits
        .iter()
        .map(|hit| hit.record.content.clone())
        .collect();
    let answer = state.responder.answer(&request.question, &source_chunks).await;

    Ok(Json(AskResponse {
        question: request.question,
        answer,
        source_chunks,
    }))
}

/// Embeds the question and searches the store, degrading to an empty hit
/// list when retrieval fails so the responder can still produce an answer.
async fn retrieve(
    state: &AppState,
    collection: Option<&str>,
    question: &str,
    top_k: usize,
) -> Vec<ScoredChunk> {
    let embedding = query_embedding_or_zero(&*state.embedder, question).await;
    match state.store.search(collection, &embedding, top_k).await {
        Ok(hits) => hits,
        Err(err) => {
            tracing::warn!("retrieval failed, answering without context: {err}");
            Vec::new()
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
