/// Todo endpoints
///
/// Every operation is scoped to the authenticated principal: ownership
/// comes from the token, never from the request body, and lookups are
/// keyed on (id, owner) so another user's todo is indistinguishable
/// from one that does not exist.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use tasknest_shared::auth::middleware::AuthContext;
use tasknest_shared::models::todo::{CreateTodo, Todo, TodoFilter, TodoPatch, TodoState};

/// Request body for creating a todo
#[derive(Debug, Deserialize, Validate)]
pub struct TodoCreateRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    pub description: String,

    pub state: TodoState,
}

/// Public projection of a todo record
///
/// The owner id is implied by the credential and not echoed back.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoPublic {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub state: TodoState,
}

impl From<Todo> for TodoPublic {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            state: todo.state,
        }
    }
}

/// Response body for listing todos
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<TodoPublic>,
}

/// Query parameters for listing todos
///
/// Filters combine with AND; text filters are literal case-sensitive
/// substring matches.
#[derive(Debug, Deserialize, Validate)]
pub struct TodoListQuery {
    #[validate(length(min = 3, max = 20, message = "title filter must be 3-20 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 3, max = 20, message = "description filter must be 3-20 characters"))]
    pub description: Option<String>,

    pub state: Option<TodoState>,

    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be non-negative"))]
    pub offset: i64,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Request body for partially updating a todo
///
/// Absent fields keep their stored value. The owner is not part of the
/// mutable surface; an unknown key such as `user_id` is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct TodoPatchRequest {
    #[validate(length(min = 3, max = 20, message = "title must be 3-20 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 3, max = 20, message = "description must be 3-20 characters"))]
    pub description: Option<String>,

    pub state: Option<TodoState>,
}

/// Generic message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /v1/todos
///
/// Creates a todo owned by the caller. Returns 201.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<TodoCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate().map_err(ApiError::from_validation)?;

    let todo = Todo::create(
        &state.db,
        CreateTodo {
            title: request.title,
            description: request.description,
            state: request.state,
            user_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(todo_id = todo.id, user_id = auth.user_id, "todo created");

    Ok((StatusCode::CREATED, Json(TodoPublic::from(todo))))
}

/// GET /v1/todos
///
/// Lists the caller's todos in insertion order, narrowed by the
/// optional filters and windowed by offset/limit.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TodoListQuery>,
) -> ApiResult<Json<TodoListResponse>> {
    query.validate().map_err(ApiError::from_validation)?;

    let filter = TodoFilter {
        title: query.title,
        description: query.description,
        state: query.state,
    };

    let todos =
        Todo::list_by_owner(&state.db, auth.user_id, &filter, query.limit, query.offset).await?;

    Ok(Json(TodoListResponse {
        todos: todos.into_iter().map(TodoPublic::from).collect(),
    }))
}

/// PATCH /v1/todos/:todo_id
///
/// Merges the provided fields into the caller's todo. A todo owned by
/// someone else reports 404, same as a missing one.
pub async fn patch_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(todo_id): Path<i64>,
    Json(request): Json<TodoPatchRequest>,
) -> ApiResult<Json<TodoPublic>> {
    request.validate().map_err(ApiError::from_validation)?;

    let patch = TodoPatch {
        title: request.title,
        description: request.description,
        state: request.state,
    };

    let todo = Todo::update(&state.db, todo_id, auth.user_id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    Ok(Json(TodoPublic::from(todo)))
}

/// DELETE /v1/todos/:todo_id
///
/// Deletes the caller's todo, reporting 404 for anything not theirs.
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(todo_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Todo::delete(&state.db, todo_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found.".to_string()));
    }

    tracing::info!(todo_id, user_id = auth.user_id, "todo deleted");

    Ok(Json(MessageResponse {
        message: "Task has been deleted successfully.".to_string(),
    }))
}
