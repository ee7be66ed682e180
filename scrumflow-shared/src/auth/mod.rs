/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: Access/refresh token issuing and verification
/// - [`middleware`]: Bearer token extraction for request authentication
/// - [`authorization`]: Project roles, capabilities and access predicates
///
/// # Example
///
/// ```no_run
/// use scrumflow_shared::auth::password::{hash_password, verify_password};
/// use scrumflow_shared::auth::jwt::{issue_token_pair, verify_access_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("s3cret-enough")?;
/// assert!(verify_password("s3cret-enough", &hash)?);
///
/// let pair = issue_token_pair(Uuid::new_v4(), "jwt-secret-of-at-least-32-bytes!!")?;
/// verify_access_token(&pair.access_token, "jwt-secret-of-at-least-32-bytes!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
