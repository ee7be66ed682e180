/// Authentication endpoints
///
/// - `POST /v1/auth/register` - create an account and get tokens
/// - `POST /v1/auth/login` - exchange credentials for tokens
/// - `POST /v1/auth/refresh` - exchange a refresh token for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
};
use axum::{extract::State, http::StatusCode, Json};
use scrumflow_shared::{
    auth::jwt::{self, TokenPair},
    models::user::{User, UserSummary},
    services::users::{self, NewAccount},
};
use serde::{Deserialize, Serialize};

/// Returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Registers a user in the `member` group
///
/// ```text
/// POST /v1/auth/register
///
/// { "username": "alice", "password": "s3cretpass", "email": "alice@example.com" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: invalid fields or weak password
/// - `409 Conflict`: username taken
pub async fn register(
    State(state): State<AppState>,
    AppJson(account): AppJson<NewAccount>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = users::register(&state.db, account).await?;
    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserSummary::from(&user),
            tokens,
        }),
    ))
}

/// Logs a user in
///
/// # Errors
///
/// - `401 Unauthorized`: unknown user or wrong password, indistinguishably
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = users::verify_credentials(&state.db, &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let tokens = jwt::issue_token_pair(user.id, state.jwt_secret())?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: UserSummary::from(&user),
        tokens,
    }))
}

/// Issues a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token, or the user is gone
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(req): AppJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let (access_token, user_id) = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    if !User::exists(&state.db, user_id).await? {
        return Err(ApiError::Unauthorized("Invalid token".to_string()));
    }

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}
