/*!
 * HTTP handlers for the board.
 *
 * Every request reads the project's document fresh, parses it, and answers
 * with JSON built from the parsed tasks. Status updates go through the
 * rewriter and are persisted by the document store.
 */

use crate::error::{ApiError, ApiResult};
use crate::file_parser::TaskParser;
use crate::statistics::{ProjectStats, ProjectSummary};
use crate::status_rewriter::{rewrite_status, status_marker_for_key};
use crate::storage::DocumentStore;
use crate::task_manager::Task;
use crate::validation::is_valid_project_name;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub parser: Arc<TaskParser>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            parser: Arc::new(TaskParser::new()?),
        })
    }

    async fn load_tasks(&self, project: &str, failure: &str) -> ApiResult<Option<Vec<Task>>> {
        let content = self
            .store
            .read_document(project)
            .await
            .map_err(|e| ApiError::internal(failure, e))?;
        Ok(content.map(|content| self.parser.parse(&content)))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub status: String,
    /// False when the task or its status line was not found.
    pub updated: bool,
}

fn check_project(project: &str) -> ApiResult<()> {
    if is_valid_project_name(project) {
        Ok(())
    } else {
        tracing::warn!(%project, "rejected project name");
        Err(ApiError::InvalidProjectName)
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": crate::NAME,
        "version": crate::VERSION,
    }))
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectSummary>>> {
    const FAILURE: &str = "Failed to get projects";
    let entries = state
        .store
        .list_projects()
        .await
        .map_err(|e| ApiError::internal(FAILURE, e))?;

    let mut projects = Vec::with_capacity(entries.len());
    for entry in entries {
        let tasks = state.load_tasks(&entry.name, FAILURE).await?.unwrap_or_default();
        projects.push(ProjectSummary::new(entry.name, &tasks, entry.last_modified));
    }
    Ok(Json(projects))
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    check_project(&project)?;
    let tasks = state
        .load_tasks(&project, "Failed to get tasks")
        .await?
        .unwrap_or_default();
    tracing::debug!(%project, count = tasks.len(), "parsed tasks");
    Ok(Json(tasks))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> ApiResult<Json<ProjectStats>> {
    check_project(&project)?;
    let tasks = state
        .load_tasks(&project, "Failed to get project stats")
        .await?
        .unwrap_or_default();
    Ok(Json(ProjectStats::from_tasks(&tasks)))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path((project, task_id)): Path<(String, String)>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    const FAILURE: &str = "Failed to update task status";
    check_project(&project)?;
    let status_key = request.status.unwrap_or_default();

    let content = state
        .store
        .read_document(&project)
        .await
        .map_err(|e| ApiError::internal(FAILURE, e))?
        .ok_or_else(|| ApiError::NotFound("Tasks file not found".to_string()))?;

    let updated = match rewrite_status(&content, &task_id, &status_key) {
        Cow::Borrowed(_) => {
            tracing::warn!(%project, %task_id, "no status line to rewrite");
            false
        }
        Cow::Owned(rewritten) => {
            if rewritten != content {
                state
                    .store
                    .write_document(&project, &rewritten)
                    .await
                    .map_err(|e| ApiError::internal(FAILURE, e))?;
            }
            tracing::info!(%project, %task_id, status = %status_key, "task status updated");
            true
        }
    };

    Ok(Json(UpdateStatusResponse {
        success: true,
        status: status_marker_for_key(&status_key).to_string(),
        updated,
    }))
}
