/// Request authentication for Axum
///
/// Pulls the bearer token out of the `Authorization` header, verifies it as
/// an access token and produces the [`AuthContext`] that the API's auth
/// layer stores in request extensions.
///
/// The context carries only the user ID. Groups, superuser status and
/// project roles are loaded fresh by each handler.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::Next, response::Response};
/// use scrumflow_shared::auth::middleware::{authenticate, AuthError};
///
/// async fn auth_layer(mut req: Request, next: Next) -> Result<Response, AuthError> {
///     let context = authenticate(req.headers(), "jwt-secret-of-at-least-32-bytes!!")?;
///     req.extensions_mut().insert(context);
///     Ok(next.run(req).await)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{verify_access_token, JwtError};

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}

/// Extracts the raw token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Verifies the request's bearer token and returns the caller's context
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = verify_access_token(token, secret)?;

    Ok(AuthContext { user_id: claims.sub })
}
