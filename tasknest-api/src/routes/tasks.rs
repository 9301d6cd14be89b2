/// Task endpoints
///
/// Owner-scoped CRUD over the authenticated caller's tasks. Every handler
/// reads the acting identity from the [`AuthContext`] the access gate placed
/// in request extensions; an owner id in the request body or path is never
/// trusted. A task that exists but belongs to another user is reported as
/// 404, identically to a task that does not exist.
///
/// # Endpoints
///
/// - `GET    /tasks` - List the caller's tasks
/// - `POST   /tasks` - Create a task owned by the caller
/// - `PUT    /tasks/:id` - Update one of the caller's tasks
/// - `DELETE /tasks/:id` - Delete one of the caller's tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// There is intentionally no owner field; ownership comes from the token.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Task description (optional, defaults to empty)
    #[serde(default)]
    pub description: String,
}

/// Update task request
///
/// All fields optional; omitted fields are left unchanged. `isComplete` is
/// accepted as an alias because the original web client sends it on edits.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New completion state
    #[serde(alias = "isComplete")]
    pub is_complete: Option<bool>,
}

/// List the caller's tasks
///
/// Returns the caller's tasks in insertion order; an empty array if none.
/// Other users' tasks never appear, regardless of input.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_owner(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

/// Create a task owned by the caller
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Storage failure
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, "Created task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update one of the caller's tasks
///
/// # Errors
///
/// - `404 Not Found`: No task with that id for this caller (a task owned by
///   someone else looks exactly the same)
/// - `500 Internal Server Error`: Storage failure
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::update(
        &state.db,
        task_id,
        auth.user_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            is_complete: req.is_complete,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete one of the caller's tasks
///
/// # Errors
///
/// - `404 Not Found`: No task with that id for this caller
/// - `500 Internal Server Error`: Storage failure
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, task_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
