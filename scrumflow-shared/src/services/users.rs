/// Account registration and credential checks

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{is_unique_violation, ServiceError, ServiceResult};
use crate::models::user::{CreateUser, User, MEMBER_GROUP};

/// Sign-up input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    pub password: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

/// Creates an account and puts it in the `member` group
///
/// # Errors
///
/// - `Validation` for bad fields or a weak password
/// - `Conflict` if the username is taken
pub async fn register(pool: &PgPool, mut account: NewAccount) -> ServiceResult<User> {
    account.username = account.username.trim().to_string();
    account.validate()?;
    validate_password_strength(&account.password)?;

    let password_hash = hash_password(&account.password)?;

    let mut tx = pool.begin().await?;

    let created = User::create(
        &mut *tx,
        CreateUser {
            username: account.username,
            email: account.email.unwrap_or_default(),
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash,
            is_superuser: false,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ServiceError::Conflict("Username is already taken".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    User::add_to_group(&mut *tx, user.id, MEMBER_GROUP).await?;
    tx.commit().await?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Checks a username/password pair
///
/// Returns `None` for an unknown user or a wrong password alike.
pub async fn verify_credentials(pool: &PgPool, username: &str, password: &str) -> ServiceResult<Option<User>> {
    let Some(user) = User::find_by_username(pool, username.trim()).await? else {
        debug!(username = %username, "Login for unknown user");
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash)? {
        debug!(user_id = %user.id, "Login with wrong password");
        return Ok(None);
    }

    Ok(Some(user))
}

/// Looks up a user ID by username
pub async fn find_user_id(pool: &PgPool, username: &str) -> ServiceResult<Uuid> {
    User::find_by_username(pool, username.trim())
        .await?
        .map(|user| user.id)
        .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::PasswordError;

    fn account(username: &str, email: Option<&str>) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password: "scrumflow1".to_string(),
            email: email.map(str::to_string),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn test_account_validation() {
        assert!(account("alice", None).validate().is_ok());
        assert!(account("alice", Some("alice@example.com")).validate().is_ok());
        assert!(account("", None).validate().is_err());
        assert!(account("alice", Some("not-an-email")).validate().is_err());
    }

    #[test]
    fn test_weak_password_maps_to_validation_error() {
        let err = ServiceError::from(PasswordError::TooWeak("must contain a digit"));

        match err {
            ServiceError::Validation(details) => {
                assert_eq!(details[0].field, "password");
                assert_eq!(details[0].message, "Password must contain a digit");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
