use axum::{
    extract::{Path, State},
    Extension, Json,
};
use ecomatch_core::Task;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{users::UserItem, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl From<&Task> for TaskItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            lat: task.anchor.center().latitude(),
            lon: task.anchor.center().longitude(),
            radius_km: task.anchor.radius_km(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserMatchItem {
    #[serde(flatten)]
    pub user: UserItem,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct TaskMatchesData {
    pub task: TaskItem,
    pub matches: Vec<UserMatchItem>,
}

fn task_not_found(request_id: String, task_id: &str) -> ApiError {
    ApiError::new(
        request_id,
        "not_found",
        format!("task '{task_id}' not found"),
    )
}

pub(super) async fn list_tasks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<TaskItem>>> {
    let data = state.roster.tasks().iter().map(TaskItem::from).collect();
    Json(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse<TaskItem>>, ApiError> {
    let task = state
        .roster
        .task(&task_id)
        .ok_or_else(|| task_not_found(req_id.0.clone(), &task_id))?;
    Ok(Json(ApiResponse::new(TaskItem::from(task), req_id.0)))
}

pub(super) async fn list_task_matches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(task_id): Path<String>,
) -> Result<Json<ApiResponse<TaskMatchesData>>, ApiError> {
    let task = state
        .roster
        .task(&task_id)
        .ok_or_else(|| task_not_found(req_id.0.clone(), &task_id))?;

    let matches: Vec<UserMatchItem> = state
        .roster
        .matches_for_anchor(&task.anchor)
        .into_iter()
        .map(|m| UserMatchItem {
            user: UserItem::from(m.identity),
            distance_km: m.distance_km,
        })
        .collect();

    tracing::debug!(task = %task.id, matched = matches.len(), "task matches");

    Ok(Json(ApiResponse::new(
        TaskMatchesData {
            task: TaskItem::from(task),
            matches,
        },
        req_id.0,
    )))
}
