/// Bearer-token authentication
///
/// `require_auth` rejects requests without a valid access token and stores
/// the caller's [`AuthContext`] in the request extensions. Handlers then take
/// a [`CurrentUser`], which loads the principal (user and groups) fresh for
/// every request.

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use scrumflow_shared::auth::{
    authorization::{AuthzError, Principal},
    middleware::{authenticate, AuthContext},
};

/// Middleware validating the `Authorization: Bearer` header
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let context = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %context.user_id, "Authenticated request");
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// The authenticated caller
///
/// Only usable on routes behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        // A token can outlive its user
        let principal = Principal::load(&state.db, context.user_id)
            .await
            .map_err(|e| match e {
                AuthzError::UnknownUser(_) => ApiError::Unauthorized("Invalid token".to_string()),
                other => ApiError::from(other),
            })?;

        Ok(CurrentUser(principal))
    }
}
