//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::types::{
    ElementResponse, HealthResponse, QueryRequest, QueryResponse, StatusResponse, TagResponse,
};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tagdb_core::QueryError;
use tagdb_core::primitives::INVALID_KEY_RENDER;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get store status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;

    let response = StatusResponse {
        owner: store.owner().to_string(),
        element_count: store.size(),
        tag_count: store.indexed_tags().count(),
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// QUERY HANDLER
// =============================================================================

/// Execute a raw query string.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    match state.execute(&request.query).await {
        // A show of a missing key renders rather than rejects on the line
        // protocol; over HTTP it is a lookup miss like any other.
        Ok(response) if response == INVALID_KEY_RENDER => (
            StatusCode::NOT_FOUND,
            Json(QueryResponse::rejected(response)),
        ),
        Ok(response) => (StatusCode::OK, Json(QueryResponse::success(response))),
        Err(e) => (
            status_for_rejection(&e),
            Json(QueryResponse::rejected(e.to_string())),
        ),
    }
}

/// HTTP status for a rejected query.
fn status_for_rejection(error: &QueryError) -> StatusCode {
    match error {
        QueryError::KeyNotFound => StatusCode::NOT_FOUND,
        QueryError::KeyExists => StatusCode::CONFLICT,
        QueryError::QueryTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    }
}

// =============================================================================
// ELEMENT HANDLER
// =============================================================================

/// Get a snapshot of one element.
pub async fn element_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.get(&key) {
        Some(element) => (
            StatusCode::OK,
            Json(ElementResponse::found(&key, &element)),
        ),
        None => (StatusCode::NOT_FOUND, Json(ElementResponse::not_found(&key))),
    }
}

// =============================================================================
// TAG HANDLER
// =============================================================================

/// List the keys carrying a tag.
pub async fn tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    let indexed = store.indexed_tags().any(|t| t == tag);
    let keys = store.keys_by_tag(&tag).into_iter().collect();

    (StatusCode::OK, Json(TagResponse { tag, indexed, keys }))
}
