/// Task endpoints
///
/// # Endpoints
///
/// - `GET    /tasks?status=&assignee=` - Query tasks (200, or 204 when nothing matches)
/// - `POST   /tasks` - Create a task (201 with `Location`)
/// - `GET    /tasks/:id` - Get one task
/// - `PUT    /tasks/:id` - Replace a task's mutable fields
/// - `DELETE /tasks/:id` - Delete a task (ADMIN only)
///
/// All endpoints require a bearer token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{empty_string_as_none, Caller, ValidatedJson},
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::TryStreamExt;
use serde::Deserialize;
use tasktrack_shared::{
    auth::policy::{authorize, Operation},
    models::task::{NewTask, Task, TaskFilter, TaskPriority, TaskStatus, TaskUpdate},
    store::RepositoryError,
};
use uuid::Uuid;
use validator::Validate;

/// Query string for `GET /tasks`
///
/// Empty values (`?status=`) are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub assignee: Option<Uuid>,
}

impl From<TaskQuery> for TaskFilter {
    fn from(query: TaskQuery) -> Self {
        TaskFilter {
            status: query.status,
            assignee_id: query.assignee,
        }
    }
}

/// Create request
///
/// There is no status field; any `status` sent by the client is ignored and
/// the task starts as `TODO`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    #[serde(default)]
    pub priority: TaskPriority,

    pub assignee_id: Option<Uuid>,
}

/// Update request; every mutable field is replaced
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    pub assignee_id: Option<Uuid>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(query_tasks).post(create_task))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

/// Query tasks with optional status and assignee filters
pub async fn query_tasks(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Response> {
    authorize(caller.context(), Operation::QueryTasks)?;
    let Query(query) = query?;

    let tasks: Vec<Task> = state
        .tasks
        .query_tasks(query.into())
        .try_collect()
        .await?;

    if tasks.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(tasks).into_response())
}

/// Create a task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: Invalid input or unknown assignee
pub async fn create_task(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<ValidatedJson<CreateTaskRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let caller = authorize(caller.context(), Operation::CreateTask)?;
    let ValidatedJson(req) = payload?;

    let task = state
        .tasks
        .create_task(NewTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            assignee_id: req.assignee_id,
            creator_id: caller.user_id,
        })
        .await?;

    tracing::info!(task_id = %task.id, creator_id = %caller.user_id, "Task created");

    let location = format!("/tasks/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

/// Get a task by id
///
/// # Errors
///
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    authorize(caller.context(), Operation::GetTask)?;
    let Path(id) = id?;

    Ok(Json(state.tasks.get_task(id).await?))
}

/// Replace a task's title, description, status, priority, and assignee
///
/// Any authenticated user may update any task.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid input, unknown assignee, or no such task
pub async fn update_task(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ValidatedJson<UpdateTaskRequest>, ApiError>,
) -> ApiResult<Json<Task>> {
    let caller = authorize(caller.context(), Operation::UpdateTask)?;
    let Path(id) = id?;
    let ValidatedJson(req) = payload?;

    let update = TaskUpdate {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        assignee_id: req.assignee_id,
    };

    let task = state
        .tasks
        .update_task(id, update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound(_) => ApiError::BadRequest("Task not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(task_id = %task.id, user_id = %caller.user_id, status = %task.status, "Task updated");
    Ok(Json(task))
}

/// Delete a task
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an ADMIN
/// - `404 Not Found`: No such task
pub async fn delete_task(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let caller = authorize(caller.context(), Operation::DeleteTask)?;
    let Path(id) = id?;

    state.tasks.delete_task(id).await?;

    tracing::info!(task_id = %id, user_id = %caller.user_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
