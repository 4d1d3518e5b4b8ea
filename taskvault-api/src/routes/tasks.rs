/// Task endpoints
///
/// # Endpoints
///
/// - `POST /task` - create a task owned by the caller
/// - `GET /tasks` - list visible tasks with filters and pagination
/// - `GET /tasks/:id` - fetch one task
/// - `PUT /tasks/:id` - partially update one task
/// - `DELETE /tasks/:id` - delete one task
///
/// Handlers are thin: they extract the verified identity and hand the raw
/// inputs to the task access layer, which owns validation and every
/// ownership decision. The path id stays a string until that layer parses
/// it, so a malformed id is rejected by the same code that guards the
/// store.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use taskvault_shared::auth::middleware::Identity;
use taskvault_shared::models::task::{TaskDraft, TaskPage, TaskRecord};
use taskvault_shared::tasks::ListParams;

use crate::{app::AppState, error::ApiResult};

/// Create task response
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    /// New task id
    pub task_id: Uuid,
}

/// Creates a task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: a required field is missing or empty, or the due
///   date cannot be parsed
/// - `500 Internal Server Error`: store failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let task_id = state.tasks.create(&identity, draft).await?;

    Ok((StatusCode::CREATED, Json(CreateTaskResponse { task_id })))
}

/// Lists tasks visible to the caller
///
/// Admins see every owner's tasks; other callers only their own.
///
/// # Errors
///
/// - `400 Bad Request`: unparsable `page`, `page_size`, or `due_date_from`
/// - `500 Internal Server Error`: store failure
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<TaskPage>> {
    let page = state.tasks.list(&identity, params).await?;

    Ok(Json(page))
}

/// Fetches a single task
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: the task belongs to someone else (non-admin caller)
/// - `404 Not Found`: no such task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<TaskRecord>> {
    let task = state.tasks.get_by_id(&identity, &raw_id).await?;

    Ok(Json(task))
}

/// Partially updates a task
///
/// Only present, non-empty fields are applied; ownership never changes.
///
/// # Errors
///
/// - `400 Bad Request`: malformed id or unparsable due date
/// - `403 Forbidden`: the task belongs to someone else (non-admin caller)
/// - `404 Not Found`: no such task
/// - `409 Conflict`: the record changed between read and write
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<StatusCode> {
    state.tasks.update(&identity, &raw_id, draft).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a task
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `403 Forbidden`: the task belongs to someone else (non-admin caller)
/// - `404 Not Found`: no such task
/// - `409 Conflict`: the record changed between read and write
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(&identity, &raw_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
