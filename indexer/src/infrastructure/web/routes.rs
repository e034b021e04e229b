// Admin API routes for the stake indexer

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::application::sync::{NetworkManager, SyncMode, SyncReport, SyncState};
use crate::config::Network;

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<NetworkManager>,
}

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/sync/status", get(all_statuses))
        .route("/api/sync/resync", post(resync_all))
        .route("/api/sync/{network}/status", get(network_status))
        .route("/api/sync/{network}/resync", post(resync_network))
        .route("/api/sync/{network}/incremental", post(incremental_network))
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Stake Indexer Admin API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /api/health",
            "GET /api/sync/status",
            "GET /api/sync/{network}/status",
            "POST /api/sync/resync",
            "POST /api/sync/{network}/resync",
            "POST /api/sync/{network}/incremental",
        ]
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "networks": state.manager.enabled_networks(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn all_statuses(State(state): State<AppState>) -> Result<Response, ApiError> {
    let statuses = state
        .manager
        .status(None)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(statuses).into_response())
}

async fn network_status(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Response, ApiError> {
    let network = parse_network(&network)?;
    let statuses = state
        .manager
        .status(Some(network))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    match statuses.into_iter().next() {
        Some(status) => Ok(Json(status).into_response()),
        None => Err(ApiError::NotFound(format!("no status for {}", network))),
    }
}

async fn resync_all(State(state): State<AppState>) -> Response {
    let reports = state.manager.sync_all(SyncMode::Full).await;
    let status = if reports.iter().all(|r| r.success) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(reports)).into_response()
}

async fn resync_network(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Response, ApiError> {
    let network = parse_network(&network)?;
    Ok(report_response(state.manager.run_sync(network, SyncMode::Full).await))
}

async fn incremental_network(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Response, ApiError> {
    let network = parse_network(&network)?;
    Ok(report_response(
        state.manager.run_sync(network, SyncMode::Incremental).await,
    ))
}

fn parse_network(raw: &str) -> Result<Network, ApiError> {
    raw.parse::<Network>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// A report that never left `Idle` was turned away before running
fn report_response(report: SyncReport) -> Response {
    let status = if report.success {
        StatusCode::OK
    } else if report.final_state == SyncState::Idle {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(report)).into_response()
}

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
