/// User story (work item) model and database operations
///
/// A user story lives in exactly one backlog: the product backlog of a
/// project, or the backlog of a sprint. Storage keeps two nullable columns
/// guarded by a `CHECK` constraint; in Rust the link is a [`BacklogRef`],
/// which cannot express "both" or "neither". Rows that somehow violate the
/// rule fail conversion with an invariant error instead of being guessed at.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE story_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE user_stories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     story_points INTEGER,
///     priority story_priority NOT NULL DEFAULT 'medium',
///     product_backlog_id UUID REFERENCES product_backlogs(id) ON DELETE CASCADE,
///     sprint_backlog_id UUID REFERENCES sprint_backlogs(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT user_stories_one_backlog
///         CHECK (num_nonnulls(product_backlog_id, sprint_backlog_id) = 1)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::Validate;

use crate::error::ServiceError;

/// Story priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "story_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StoryPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl StoryPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryPriority::Low => "low",
            StoryPriority::Medium => "medium",
            StoryPriority::High => "high",
        }
    }
}

/// The one backlog a story belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BacklogRef {
    /// In a project's product backlog (product backlog ID)
    Product(Uuid),

    /// In a sprint's backlog (sprint backlog ID)
    Sprint(Uuid),
}

impl BacklogRef {
    /// Builds a reference from the two storage columns
    pub fn from_columns(
        product_backlog_id: Option<Uuid>,
        sprint_backlog_id: Option<Uuid>,
    ) -> Result<Self, ServiceError> {
        match (product_backlog_id, sprint_backlog_id) {
            (Some(id), None) => Ok(BacklogRef::Product(id)),
            (None, Some(id)) => Ok(BacklogRef::Sprint(id)),
            (Some(_), Some(_)) => Err(ServiceError::InvariantViolation(
                "user story references both a product and a sprint backlog".to_string(),
            )),
            (None, None) => Err(ServiceError::InvariantViolation(
                "user story references no backlog".to_string(),
            )),
        }
    }

    /// Splits the reference into the two storage columns
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match *self {
            BacklogRef::Product(id) => (Some(id), None),
            BacklogRef::Sprint(id) => (None, Some(id)),
        }
    }

    pub fn is_product(&self) -> bool {
        matches!(self, BacklogRef::Product(_))
    }

    pub fn is_sprint(&self) -> bool {
        matches!(self, BacklogRef::Sprint(_))
    }

    /// Looks up the project that owns the referenced backlog
    ///
    /// Returns None if the backlog no longer exists.
    pub async fn project_id<'e, E>(&self, executor: E) -> Result<Option<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        match *self {
            BacklogRef::Product(id) => {
                sqlx::query_scalar("SELECT project_id FROM product_backlogs WHERE id = $1")
                    .bind(id)
                    .fetch_optional(executor)
                    .await
            }
            BacklogRef::Sprint(id) => {
                sqlx::query_scalar(
                    r#"
                    SELECT s.project_id
                    FROM sprint_backlogs sb
                    JOIN sprints s ON s.id = sb.sprint_id
                    WHERE sb.id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(executor)
                .await
            }
        }
    }
}

/// Raw `user_stories` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserStoryRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub story_points: Option<i32>,
    pub priority: StoryPriority,
    pub product_backlog_id: Option<Uuid>,
    pub sprint_backlog_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User story with its backlog link checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub story_points: Option<i32>,
    pub priority: StoryPriority,
    pub backlog: BacklogRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserStoryRow> for UserStory {
    type Error = ServiceError;

    fn try_from(row: UserStoryRow) -> Result<Self, Self::Error> {
        let backlog = BacklogRef::from_columns(row.product_backlog_id, row.sprint_backlog_id)
            .map_err(|e| match e {
                ServiceError::InvariantViolation(msg) => {
                    ServiceError::InvariantViolation(format!("story {}: {}", row.id, msg))
                }
                other => other,
            })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            story_points: row.story_points,
            priority: row.priority,
            backlog,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Editable story fields
///
/// Callers never supply the backlog link; services assign it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StoryFields {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "crate::models::not_blank", message = "Title is required")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    #[validate(range(min = 0, max = 100, message = "Story points must be between 0 and 100"))]
    pub story_points: Option<i32>,

    #[serde(default)]
    pub priority: StoryPriority,
}

/// Partial update of a story
///
/// `None` keeps the current value. `story_points: Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStory {
    pub title: Option<String>,
    pub description: Option<String>,

    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub story_points: Option<Option<i32>>,

    pub priority: Option<StoryPriority>,
}

/// Maps a present `null` to `Some(None)`; an absent field stays `None`
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

impl UpdateStory {
    /// Merges the update onto the story's current fields
    pub fn apply_to(&self, story: &UserStory) -> StoryFields {
        StoryFields {
            title: self.title.clone().unwrap_or_else(|| story.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| story.description.clone()),
            story_points: self.story_points.unwrap_or(story.story_points),
            priority: self.priority.unwrap_or(story.priority),
        }
    }
}

const STORY_COLUMNS: &str = "id, title, description, story_points, priority, \
     product_backlog_id, sprint_backlog_id, created_at, updated_at";

impl UserStory {
    /// Inserts a story into a backlog
    pub async fn create<'e, E>(
        executor: E,
        fields: &StoryFields,
        backlog: BacklogRef,
    ) -> Result<Self, ServiceError>
    where
        E: PgExecutor<'e>,
    {
        let (product_backlog_id, sprint_backlog_id) = backlog.columns();

        let row = sqlx::query_as::<_, UserStoryRow>(&format!(
            r#"
            INSERT INTO user_stories
                (title, description, story_points, priority, product_backlog_id, sprint_backlog_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.story_points)
        .bind(fields.priority)
        .bind(product_backlog_id)
        .bind(sprint_backlog_id)
        .fetch_one(executor)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, ServiceError>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, UserStoryRow>(&format!(
            "SELECT {STORY_COLUMNS} FROM user_stories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(UserStory::try_from).transpose()
    }

    /// Overwrites the editable fields; the backlog link is untouched
    pub async fn update_fields<'e, E>(
        executor: E,
        id: Uuid,
        fields: &StoryFields,
    ) -> Result<Option<Self>, ServiceError>
    where
        E: PgExecutor<'e>,
    {
        let row = sqlx::query_as::<_, UserStoryRow>(&format!(
            r#"
            UPDATE user_stories
            SET title = $2, description = $3, story_points = $4, priority = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.story_points)
        .bind(fields.priority)
        .fetch_optional(executor)
        .await?;

        row.map(UserStory::try_from).transpose()
    }

    /// Relinks a story to another backlog
    ///
    /// Both columns change in one statement, so no reader ever sees the
    /// story in two backlogs or in none.
    pub async fn set_backlog<'e, E>(
        executor: E,
        id: Uuid,
        backlog: BacklogRef,
    ) -> Result<Option<Self>, ServiceError>
    where
        E: PgExecutor<'e>,
    {
        let (product_backlog_id, sprint_backlog_id) = backlog.columns();

        let row = sqlx::query_as::<_, UserStoryRow>(&format!(
            r#"
            UPDATE user_stories
            SET product_backlog_id = $2, sprint_backlog_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(product_backlog_id)
        .bind(sprint_backlog_id)
        .fetch_optional(executor)
        .await?;

        row.map(UserStory::try_from).transpose()
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM user_stories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the stories of one backlog, oldest first
    pub async fn list_by_backlog<'e, E>(executor: E, backlog: BacklogRef) -> Result<Vec<Self>, ServiceError>
    where
        E: PgExecutor<'e>,
    {
        let column = match backlog {
            BacklogRef::Product(_) => "product_backlog_id",
            BacklogRef::Sprint(_) => "sprint_backlog_id",
        };
        let (BacklogRef::Product(backlog_id) | BacklogRef::Sprint(backlog_id)) = backlog;

        let rows = sqlx::query_as::<_, UserStoryRow>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM user_stories
            WHERE {column} = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(backlog_id)
        .fetch_all(executor)
        .await?;

        rows.into_iter().map(UserStory::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: Option<Uuid>, sprint: Option<Uuid>) -> UserStoryRow {
        UserStoryRow {
            id: Uuid::new_v4(),
            title: "Login flow".to_string(),
            description: String::new(),
            story_points: Some(3),
            priority: StoryPriority::High,
            product_backlog_id: product,
            sprint_backlog_id: sprint,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_with_one_backlog_converts() {
        let backlog_id = Uuid::new_v4();

        let story = UserStory::try_from(row(Some(backlog_id), None)).unwrap();
        assert_eq!(story.backlog, BacklogRef::Product(backlog_id));

        let story = UserStory::try_from(row(None, Some(backlog_id))).unwrap();
        assert_eq!(story.backlog, BacklogRef::Sprint(backlog_id));
    }

    #[test]
    fn test_row_with_both_or_neither_backlog_is_invariant_violation() {
        let both = UserStory::try_from(row(Some(Uuid::new_v4()), Some(Uuid::new_v4())));
        assert!(matches!(both, Err(ServiceError::InvariantViolation(_))));

        let neither = UserStory::try_from(row(None, None));
        assert!(matches!(neither, Err(ServiceError::InvariantViolation(_))));
    }

    #[test]
    fn test_columns_have_exactly_one_value() {
        let id = Uuid::new_v4();
        for backlog in [BacklogRef::Product(id), BacklogRef::Sprint(id)] {
            let (product, sprint) = backlog.columns();
            assert!(product.is_some() ^ sprint.is_some());
            assert_eq!(BacklogRef::from_columns(product, sprint).unwrap(), backlog);
        }
    }

    #[test]
    fn test_story_fields_validation() {
        let mut fields = StoryFields {
            title: "Login flow".to_string(),
            ..Default::default()
        };
        assert!(fields.validate().is_ok());

        fields.title = String::new();
        assert!(fields.validate().is_err());

        fields.title = "   ".to_string();
        assert!(fields.validate().is_err());

        fields.title = "t".repeat(201);
        assert!(fields.validate().is_err());

        fields.title = "Login flow".to_string();
        fields.story_points = Some(101);
        assert!(fields.validate().is_err());

        fields.story_points = Some(-1);
        assert!(fields.validate().is_err());
    }

    #[test]
    fn test_update_merges_and_clears_points() {
        let story = UserStory::try_from(row(Some(Uuid::new_v4()), None)).unwrap();

        let update = UpdateStory {
            story_points: Some(None),
            priority: Some(StoryPriority::Low),
            ..Default::default()
        };
        let fields = update.apply_to(&story);
        assert_eq!(fields.title, "Login flow");
        assert_eq!(fields.story_points, None);
        assert_eq!(fields.priority, StoryPriority::Low);

        let untouched = UpdateStory::default().apply_to(&story);
        assert_eq!(untouched.story_points, Some(3));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: UpdateStory = serde_json::from_str(r#"{"story_points": null}"#).unwrap();
        assert_eq!(cleared.story_points, Some(None));

        let absent: UpdateStory = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(absent.story_points, None);

        let set: UpdateStory = serde_json::from_str(r#"{"story_points": 8}"#).unwrap();
        assert_eq!(set.story_points, Some(Some(8)));
    }

    #[test]
    fn test_backlog_ref_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(BacklogRef::Sprint(id)).unwrap();
        assert_eq!(json["kind"], "sprint");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(StoryPriority::default().as_str(), "medium");
    }
}
