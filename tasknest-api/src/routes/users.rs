/// User account endpoints
///
/// Account creation and listing are public; update and delete require
/// a bearer token and succeed only when the path id names the caller's
/// own account. Passwords are hashed before they touch the store and
/// never appear in any response.
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
use tasknest_shared::auth::{authorization::require_ownership, middleware::AuthContext};
use tasknest_shared::auth::password::hash_password;
use tasknest_shared::models::user::{CreateUser, UpdateUser, User};

/// Request body for creating or replacing a user account
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 255, message = "username must be 1-255 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Public projection of a user record
///
/// The password hash stays server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Response body for listing users
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserPublic>,
}

/// Generic message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Pagination window for list endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
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

/// POST /v1/users
///
/// Creates an account. Returns 201 with the public projection, or 409
/// when the username or email is already taken (username reported
/// first when both collide).
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate().map_err(ApiError::from_validation)?;

    let password_hash = hash_password(&request.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: request.username,
            email: request.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "user account created");

    Ok((StatusCode::CREATED, Json(UserPublic::from(user))))
}

/// GET /v1/users
///
/// Lists accounts in insertion order, windowed by offset/limit.
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<UserListResponse>> {
    page.validate().map_err(ApiError::from_validation)?;

    let users = User::list(&state.db, page.limit, page.offset).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserPublic::from).collect(),
    }))
}

/// PUT /v1/users/:user_id
///
/// Whole-record replacement of the caller's own account. Acting on any
/// other id is refused with 403 before the store is touched.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
    Json(request): Json<UserRequest>,
) -> ApiResult<Json<UserPublic>> {
    require_ownership(&auth, user_id)?;

    request.validate().map_err(ApiError::from_validation)?;

    let password_hash = hash_password(&request.password)?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            username: request.username,
            email: request.email,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserPublic::from(user)))
}

/// DELETE /v1/users/:user_id
///
/// Deletes the caller's own account together with every todo it owns,
/// in one transaction.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    require_ownership(&auth, user_id)?;

    let deleted = User::delete_cascading(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, "user account deleted");

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}
