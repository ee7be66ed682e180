/// Project model and database operations
///
/// A project has exactly one owner, fixed at creation. The owner is an
/// implicit member and is never stored in `project_members`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a project cascades to its memberships, product backlog and
/// sprints, and from there to every user story it contains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::Validate;

/// Project model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,

    /// Owning user; immutable after creation
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Mutable project fields, validated before every write
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProjectFields {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "crate::models::not_blank", message = "Name is required")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
}

/// Partial update of a project
///
/// Only `name` and `description` can change. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateProject {
    /// Merges the update onto the current fields
    pub fn apply_to(&self, project: &Project) -> ProjectFields {
        ProjectFields {
            name: self.name.clone().unwrap_or_else(|| project.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| project.description.clone()),
        }
    }
}

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at";

impl Project {
    /// Inserts a project owned by `owner_id`
    pub async fn create<'e, E>(
        executor: E,
        owner_id: Uuid,
        fields: &ProjectFields,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(owner_id)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Overwrites the mutable fields of a project
    ///
    /// Returns None if the project does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        fields: &ProjectFields,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Deletes a project, returning its name if it existed
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<Option<String>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let name: Option<String> =
            sqlx::query_scalar("DELETE FROM projects WHERE id = $1 RETURNING name")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(name)
    }

    /// Lists one page of the projects a user owns or is a member of
    ///
    /// Newest first. Each project appears once even when the user is both
    /// owner and (erroneously) a member.
    pub async fn list_visible<'e, E>(
        executor: E,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects p
            WHERE p.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM project_members m
                   WHERE m.project_id = p.id AND m.user_id = $1
               )
            ORDER BY p.created_at DESC, p.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        Ok(projects)
    }

    /// Counts the projects a user owns or is a member of
    pub async fn count_visible<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM projects p
            WHERE p.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM project_members m
                   WHERE m.project_id = p.id AND m.user_id = $1
               )
            "#,
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Lists every project a user owns or is a member of, newest first
    pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        Self::list_visible(executor, user_id, i64::MAX, 0).await
    }
}
