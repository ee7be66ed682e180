/// Product and sprint backlogs
///
/// Each backlog is one-to-one with its owner (a project or a sprint) through
/// a unique foreign key, and is created on first use. Get-or-create is an
/// upsert rather than check-then-insert:
///
/// 1. `INSERT .. ON CONFLICT DO NOTHING RETURNING` creates the row if absent
/// 2. if another writer got there first, `SELECT` the existing row
/// 3. if that row vanished in between (owner deleted), try once more
///
/// # Schema
///
/// ```sql
/// CREATE TABLE product_backlogs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL UNIQUE REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE sprint_backlogs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     sprint_id UUID NOT NULL UNIQUE REFERENCES sprints(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::{debug, warn};
use uuid::Uuid;

/// Attempts made by get-or-create before giving up
const GET_OR_CREATE_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductBacklog {
    pub id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SprintBacklog {
    pub id: Uuid,
    pub sprint_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ProductBacklog {
    /// Returns the project's product backlog, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if the project does not exist, and
    /// `RowNotFound` if the row kept disappearing between insert and select.
    pub async fn get_or_create(conn: &mut PgConnection, project_id: Uuid) -> Result<Self, sqlx::Error> {
        for attempt in 1..=GET_OR_CREATE_ATTEMPTS {
            let inserted = sqlx::query_as::<_, ProductBacklog>(
                r#"
                INSERT INTO product_backlogs (project_id)
                VALUES ($1)
                ON CONFLICT (project_id) DO NOTHING
                RETURNING id, project_id, created_at
                "#,
            )
            .bind(project_id)
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(backlog) = inserted {
                debug!(project_id = %project_id, backlog_id = %backlog.id, "Created product backlog");
                return Ok(backlog);
            }

            if let Some(existing) = Self::find_by_project(&mut *conn, project_id).await? {
                return Ok(existing);
            }

            warn!(project_id = %project_id, attempt, "Product backlog vanished during get-or-create");
        }

        Err(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_project(conn: &mut PgConnection, project_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProductBacklog>(
            "SELECT id, project_id, created_at FROM product_backlogs WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(conn)
        .await
    }
}

impl SprintBacklog {
    /// Returns the sprint's backlog, creating it if needed
    ///
    /// Same contract as [`ProductBacklog::get_or_create`].
    pub async fn get_or_create(conn: &mut PgConnection, sprint_id: Uuid) -> Result<Self, sqlx::Error> {
        for attempt in 1..=GET_OR_CREATE_ATTEMPTS {
            let inserted = sqlx::query_as::<_, SprintBacklog>(
                r#"
                INSERT INTO sprint_backlogs (sprint_id)
                VALUES ($1)
                ON CONFLICT (sprint_id) DO NOTHING
                RETURNING id, sprint_id, created_at
                "#,
            )
            .bind(sprint_id)
            .fetch_optional(&mut *conn)
            .await?;

            if let Some(backlog) = inserted {
                debug!(sprint_id = %sprint_id, backlog_id = %backlog.id, "Created sprint backlog");
                return Ok(backlog);
            }

            if let Some(existing) = Self::find_by_sprint(&mut *conn, sprint_id).await? {
                return Ok(existing);
            }

            warn!(sprint_id = %sprint_id, attempt, "Sprint backlog vanished during get-or-create");
        }

        Err(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_sprint(conn: &mut PgConnection, sprint_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SprintBacklog>(
            "SELECT id, sprint_id, created_at FROM sprint_backlogs WHERE sprint_id = $1",
        )
        .bind(sprint_id)
        .fetch_optional(conn)
        .await
    }
}
