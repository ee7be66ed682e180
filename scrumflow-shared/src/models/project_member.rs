/// Project membership model and database operations
///
/// A membership row grants a user access to a project. The (project, user)
/// pair is unique at the storage layer; the project owner never has a row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT project_members_project_user_key UNIQUE (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Membership row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Membership joined with the member's public user fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberDetail {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub joined_at: DateTime<Utc>,
}

const MEMBER_DETAIL_QUERY: &str = r#"
    SELECT m.id, m.project_id, m.user_id, u.username, u.email, u.first_name, u.last_name, m.joined_at
    FROM project_members m
    JOIN users u ON u.id = m.user_id
    WHERE m.project_id = $1
    ORDER BY m.joined_at ASC, m.id ASC
"#;

impl ProjectMember {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the pair already exists, and a foreign
    /// key violation if the project or user is gone.
    pub async fn create<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            RETURNING id, project_id, user_id, joined_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(member)
    }

    /// Finds a membership by ID, scoped to one project
    ///
    /// A membership of another project is reported as absent.
    pub async fn find_in_project<'e, E>(
        executor: E,
        id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT id, project_id, user_id, joined_at
            FROM project_members
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    /// Checks whether a membership row exists for the pair
    ///
    /// This does not consider ownership; use
    /// [`crate::auth::authorization::is_member`] for access decisions.
    pub async fn exists<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Lists one page of a project's members in join order
    pub async fn list_page<'e, E>(
        executor: E,
        project_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MemberDetail>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let members = sqlx::query_as::<_, MemberDetail>(&format!(
            "{MEMBER_DETAIL_QUERY} LIMIT $2 OFFSET $3"
        ))
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }

    /// Lists every member of a project in join order
    pub async fn list_details<'e, E>(executor: E, project_id: Uuid) -> Result<Vec<MemberDetail>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let members = sqlx::query_as::<_, MemberDetail>(MEMBER_DETAIL_QUERY)
            .bind(project_id)
            .fetch_all(executor)
            .await?;

        Ok(members)
    }

    /// Counts the membership rows of a project (the owner is not counted)
    pub async fn count_by_project<'e, E>(executor: E, project_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(executor)
                .await?;

        Ok(count)
    }

    /// Deletes a membership, returning the removed user's username
    pub async fn delete_returning_username<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<String>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let username: Option<String> = sqlx::query_scalar(
            r#"
            DELETE FROM project_members m
            USING users u
            WHERE m.id = $1 AND u.id = m.user_id
            RETURNING u.username
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(username)
    }
}
