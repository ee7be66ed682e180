/// Database models for ScrumFlow
///
/// Each model owns its SQL. Functions take any `PgExecutor`, so a service
/// can run them on the pool or inside an open transaction.
///
/// # Models
///
/// - `user`: Accounts and permission groups
/// - `project`: Projects and their single owner
/// - `project_member`: Non-owner project memberships
/// - `sprint`: Time-boxed iterations of a project
/// - `backlog`: Product backlogs (per project) and sprint backlogs (per sprint)
/// - `user_story`: Work items, each in exactly one backlog
///
/// # Example
///
/// ```no_run
/// use scrumflow_shared::models::project::{Project, ProjectFields};
/// use scrumflow_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let fields = ProjectFields {
///     name: "Alpha".to_string(),
///     description: String::new(),
/// };
/// let project = Project::create(&pool, owner_id, &fields).await?;
/// # Ok(())
/// # }
/// ```

pub mod backlog;
pub mod project;
pub mod project_member;
pub mod sprint;
pub mod user;
pub mod user_story;

use validator::ValidationError;

/// Rejects text that is empty once surrounding whitespace is removed
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Alpha").is_ok());
        assert!(not_blank("  Alpha ").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
    }
}
