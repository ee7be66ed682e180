/// Sprint model
///
/// A sprint belongs to one project. Only its name is modelled; its backlog
/// lives in `sprint_backlogs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sprint {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SprintFields {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "crate::models::not_blank", message = "Name is required")
    )]
    pub name: String,
}

impl Sprint {
    pub async fn create<'e, E>(executor: E, project_id: Uuid, fields: &SprintFields) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Sprint>(
            r#"
            INSERT INTO sprints (project_id, name)
            VALUES ($1, $2)
            RETURNING id, project_id, name, created_at
            "#,
        )
        .bind(project_id)
        .bind(&fields.name)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Sprint>(
            "SELECT id, project_id, name, created_at FROM sprints WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a project's sprints, oldest first
    pub async fn list_by_project<'e, E>(executor: E, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Sprint>(
            r#"
            SELECT id, project_id, name, created_at
            FROM sprints
            WHERE project_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
