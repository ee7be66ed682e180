/// Service error taxonomy
///
/// Every service operation returns `ServiceResult<T>`. The first four
/// variants are expected outcomes that the API layer renders for the caller.
/// `InvariantViolation` means stored data broke a rule the code relies on
/// (for example a user story linked to two backlogs) and is never recovered.
///
/// # Example
///
/// ```
/// use scrumflow_shared::error::{FieldError, ServiceError};
///
/// let err = ServiceError::Validation(vec![FieldError::new("title", "Title is required")]);
/// assert!(err.is_user_facing());
/// ```

use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// Result alias used across the service layer
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity absent, or outside the scope the caller asked in
    #[error("{0}")]
    NotFound(String),

    /// An access predicate failed
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness or membership rule violated
    #[error("{0}")]
    Conflict(String),

    /// Field constraints violated
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Stored data broke an internal invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure outside the database, such as password hashing
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the error is an expected outcome a caller can act on
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            ServiceError::InvariantViolation(_) | ServiceError::Database(_) | ServiceError::Internal(_)
        )
    }

    /// Builds a single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // HashMap iteration order is random; keep responses stable
        details.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));

        ServiceError::Validation(details)
    }
}

impl From<crate::auth::authorization::AuthzError> for ServiceError {
    fn from(err: crate::auth::authorization::AuthzError) -> Self {
        use crate::auth::authorization::AuthzError;

        match err {
            AuthzError::UnknownUser(id) => ServiceError::NotFound(format!("User with id {} not found", id)),
            AuthzError::DatabaseError(e) => ServiceError::Database(e),
            other => ServiceError::Forbidden(other.to_string()),
        }
    }
}

impl From<crate::auth::password::PasswordError> for ServiceError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        use crate::auth::password::PasswordError;

        match err {
            PasswordError::TooWeak(reason) => ServiceError::invalid("password", &format!("Password {}", reason)),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Returns true if the error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Returns true if the error is a foreign key violation
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 0, max = 10, message = "Out of range"))]
        score: i32,
    }

    #[test]
    fn test_validation_errors_are_sorted_by_field() {
        let sample = Sample {
            name: String::new(),
            score: 42,
        };

        let err = ServiceError::from(sample.validate().unwrap_err());
        match err {
            ServiceError::Validation(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0], FieldError::new("name", "Name is required"));
                assert_eq!(details[1], FieldError::new("score", "Out of range"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(ServiceError::NotFound("x".into()).is_user_facing());
        assert!(ServiceError::Forbidden("x".into()).is_user_facing());
        assert!(ServiceError::Conflict("x".into()).is_user_facing());
        assert!(ServiceError::invalid("title", "bad").is_user_facing());
        assert!(!ServiceError::InvariantViolation("x".into()).is_user_facing());
        assert!(!ServiceError::Database(sqlx::Error::RowNotFound).is_user_facing());
        assert!(!ServiceError::Internal("x".into()).is_user_facing());
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolTimedOut));
    }
}
