/// Authentication endpoints
///
/// Exchanges credentials for a JWT pair and refresh tokens for fresh
/// access tokens. Both login failure modes (unknown username, wrong
/// password) collapse to the same 401 so the response does not reveal
/// which part was wrong.
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use tasknest_shared::auth::jwt::{self, Claims, TokenType};
use tasknest_shared::auth::password::verify_password;
use tasknest_shared::models::user::User;

/// Request body for logging in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body carrying a freshly minted token pair
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Request body for refreshing an access token
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response body for a refreshed access token
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect username or password".to_string())
}

/// POST /v1/auth/token
///
/// Verifies the credentials and returns an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &request.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let access_token = jwt::create_token(
        &Claims::new(user.id, TokenType::Access),
        state.jwt_secret(),
    )?;
    let refresh_token = jwt::create_token(
        &Claims::new(user.id, TokenType::Refresh),
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /v1/auth/refresh_token
///
/// Exchanges a valid refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&request.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
