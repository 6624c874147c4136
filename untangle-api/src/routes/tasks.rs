/// Task endpoints
///
/// Tasks move through `open -> in_progress -> done` with a guarded
/// transition endpoint; skipping states or reopening finished work goes
/// through the same guard.
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create a task
/// - `GET /v1/tasks` - List tasks (filter by status, due date)
/// - `GET /v1/tasks/:id` / `PUT` / `DELETE` - Single-task operations
/// - `PATCH /v1/tasks/:id/status` - Guarded status transition

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::page,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Task create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    pub due_on: Option<NaiveDate>,

    #[serde(default)]
    pub priority: TaskPriority,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub due_before: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Status transition request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TaskStatus,
}

/// Creates a task (status starts at `open`)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        auth.user_id,
        CreateTask {
            title: req.title,
            notes: req.notes,
            due_on: req.due_on,
            priority: req.priority,
        },
    )
    .await?;

    Ok(Json(task))
}

/// Lists tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let filter = TaskFilter {
        status: query.status,
        due_before: query.due_before,
    };

    let tasks = Task::list(&state.db, auth.user_id, &filter, limit, offset).await?;
    Ok(Json(tasks))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Replaces a task's editable fields (status goes through /status)
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(
        &state.db,
        auth.user_id,
        id,
        UpdateTask {
            title: req.title,
            notes: req.notes,
            due_on: req.due_on,
            priority: req.priority,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Task::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Applies a status transition
///
/// # Errors
///
/// - `409 Conflict`: Transition not allowed from the current status
pub async fn set_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !task.status.can_transition_to(req.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot transition from {} to {}",
            task.status.as_str(),
            req.status.as_str()
        )));
    }

    let task = Task::set_status(&state.db, auth.user_id, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}
