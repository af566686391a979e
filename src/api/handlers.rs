//! API request handlers

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::core::ReconcileStats;
use crate::error::BacklogResult;
use crate::pipeline::{self, InputPaths, ReconcileOutcome};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Backlog API Server".to_string(),
        version: state.version.clone(),
        description: "Weekly backlog comparison with manager and TECO enrichment".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/reconcile",
                "POST",
                "Compare two backlog workbooks and write the report",
            ),
        ],
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["reconcile".to_string()],
    }))
}

/// Reconcile request: server-side paths of the four input workbooks
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub previous_path: String,
    pub current_path: String,
    pub roster_path: String,
    pub teco_path: String,
    /// Directory for the report, server working directory when absent
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl ReconcileRequest {
    pub fn input_paths(&self) -> InputPaths {
        InputPaths {
            previous: PathBuf::from(&self.previous_path),
            current: PathBuf::from(&self.current_path),
            roster: PathBuf::from(&self.roster_path),
            teco: PathBuf::from(&self.teco_path),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
    }
}

/// Reconcile response
#[derive(Debug, Serialize, Default)]
pub struct ReconcileResponse {
    pub completed: bool,
    pub file_name: String,
    pub content_type: String,
    pub output_path: String,
    pub comparison_rows: usize,
    pub new_rows: usize,
    pub solved_rows: usize,
    /// Compared fields and delta recoveries of the run
    pub stats: ReconcileStats,
    pub message: String,
}

impl ReconcileResponse {
    fn completed(outcome: &ReconcileOutcome, path: PathBuf) -> Self {
        Self {
            completed: true,
            file_name: outcome.file_name.clone(),
            content_type: outcome.content_type().to_string(),
            output_path: path.display().to_string(),
            comparison_rows: outcome.comparison.row_count(),
            new_rows: outcome.new_items.row_count(),
            solved_rows: outcome.solved_items.row_count(),
            stats: outcome.stats.clone(),
            message: outcome.status_text(),
        }
    }
}

fn run_reconcile(
    req: &ReconcileRequest,
    config: &ReconcileConfig,
) -> BacklogResult<ReconcileResponse> {
    let outcome = pipeline::reconcile_files(&req.input_paths(), config, pipeline::today())?;
    let path = outcome.write_to_dir(&req.output_dir())?;
    Ok(ReconcileResponse::completed(&outcome, path))
}

/// POST /api/v1/reconcile - Compare backlogs and write the report
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReconcileRequest>,
) -> impl IntoResponse {
    let config = state.config.clone();
    let result = tokio::task::spawn_blocking(move || run_reconcile(&req, &config)).await;

    match result {
        Ok(Ok(response)) => {
            info!(file = %response.file_name, "reconcile request completed");
            Json(ApiResponse::ok(response))
        }
        Ok(Err(e)) => {
            warn!("reconcile request failed: {}", e);
            Json(ApiResponse::ok(ReconcileResponse {
                message: format!("Error: {}", e),
                ..Default::default()
            }))
        }
        Err(e) => Json(ApiResponse::err(format!("Reconcile task failed: {}", e))),
    }
}
