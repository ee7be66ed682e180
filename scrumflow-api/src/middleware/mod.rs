/// Middleware for the API server
///
/// - `auth`: bearer-token authentication and the `CurrentUser` extractor
/// - `security`: security response headers

pub mod auth;
pub mod security;
