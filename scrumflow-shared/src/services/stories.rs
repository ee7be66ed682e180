/// Sprint, backlog and user story service
///
/// A story is always in exactly one backlog:
///
/// ```text
///                 move_to_sprint
///   InProductBacklog ───────────▶ InSprintBacklog
///                    ◀───────────
///              move_to_product_backlog
/// ```
///
/// Backlogs are created on first use. Moves rewrite both backlog columns in
/// one `UPDATE`, and a story can only move between backlogs of its own
/// project.

use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ServiceError, ServiceResult};
use crate::models::backlog::{ProductBacklog, SprintBacklog};
use crate::models::project::Project;
use crate::models::sprint::{Sprint, SprintFields};
use crate::models::user_story::{BacklogRef, StoryFields, UpdateStory, UserStory};

use super::projects::project_not_found;

fn story_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("User story with id {} not found", id))
}

fn sprint_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Sprint with id {} not found", id))
}

pub async fn create_sprint(pool: &PgPool, project_id: Uuid, fields: SprintFields) -> ServiceResult<Sprint> {
    fields.validate()?;

    let mut tx = pool.begin().await?;
    if Project::find_by_id(&mut *tx, project_id).await?.is_none() {
        return Err(project_not_found(project_id));
    }
    let sprint = Sprint::create(&mut *tx, project_id, &fields).await?;
    tx.commit().await?;

    info!(project_id = %project_id, sprint_id = %sprint.id, "Sprint created");
    Ok(sprint)
}

pub async fn list_sprints(pool: &PgPool, project_id: Uuid) -> ServiceResult<Vec<Sprint>> {
    Ok(Sprint::list_by_project(pool, project_id).await?)
}

pub async fn get_sprint(pool: &PgPool, id: Uuid) -> ServiceResult<Sprint> {
    Sprint::find_by_id(pool, id)
        .await?
        .ok_or_else(|| sprint_not_found(id))
}

/// Stories in a project's product backlog, oldest first
pub async fn list_product_backlog(pool: &PgPool, project_id: Uuid) -> ServiceResult<Vec<UserStory>> {
    let mut tx = pool.begin().await?;
    let backlog = ProductBacklog::get_or_create(&mut tx, project_id).await?;
    let stories = UserStory::list_by_backlog(&mut *tx, BacklogRef::Product(backlog.id)).await?;
    tx.commit().await?;

    Ok(stories)
}

/// Stories in a sprint's backlog, oldest first
pub async fn list_sprint_backlog(pool: &PgPool, sprint: &Sprint) -> ServiceResult<Vec<UserStory>> {
    let mut tx = pool.begin().await?;
    let backlog = SprintBacklog::get_or_create(&mut tx, sprint.id).await?;
    let stories = UserStory::list_by_backlog(&mut *tx, BacklogRef::Sprint(backlog.id)).await?;
    tx.commit().await?;

    Ok(stories)
}

/// Creates a story in the project's product backlog
pub async fn create_in_product_backlog(
    pool: &PgPool,
    project_id: Uuid,
    fields: StoryFields,
) -> ServiceResult<UserStory> {
    fields.validate()?;

    let mut tx = pool.begin().await?;
    let backlog = ProductBacklog::get_or_create(&mut tx, project_id).await?;
    let story = UserStory::create(&mut *tx, &fields, BacklogRef::Product(backlog.id)).await?;
    tx.commit().await?;

    info!(story_id = %story.id, project_id = %project_id, "User story created in product backlog");
    Ok(story)
}

/// Creates a story in the sprint's backlog
pub async fn create_in_sprint_backlog(pool: &PgPool, sprint: &Sprint, fields: StoryFields) -> ServiceResult<UserStory> {
    fields.validate()?;

    let mut tx = pool.begin().await?;
    let backlog = SprintBacklog::get_or_create(&mut tx, sprint.id).await?;
    let story = UserStory::create(&mut *tx, &fields, BacklogRef::Sprint(backlog.id)).await?;
    tx.commit().await?;

    info!(story_id = %story.id, sprint_id = %sprint.id, "User story created in sprint backlog");
    Ok(story)
}

pub async fn get_story(pool: &PgPool, id: Uuid) -> ServiceResult<UserStory> {
    UserStory::find_by_id(pool, id)
        .await?
        .ok_or_else(|| story_not_found(id))
}

async fn project_id_of(conn: &mut PgConnection, story: &UserStory) -> ServiceResult<Uuid> {
    story.backlog.project_id(conn).await?.ok_or_else(|| {
        ServiceError::InvariantViolation(format!(
            "story {} references a backlog that does not exist",
            story.id
        ))
    })
}

/// The project a story belongs to, through whichever backlog holds it
pub async fn resolve_project(pool: &PgPool, story: &UserStory) -> ServiceResult<Project> {
    let mut conn = pool.acquire().await?;
    let project_id = project_id_of(&mut conn, story).await?;

    Project::find_by_id(&mut *conn, project_id)
        .await?
        .ok_or_else(|| project_not_found(project_id))
}

/// Moves a story into a sprint of its own project
///
/// # Errors
///
/// `Validation` if the sprint belongs to another project.
pub async fn move_to_sprint(pool: &PgPool, story_id: Uuid, sprint: &Sprint) -> ServiceResult<UserStory> {
    let mut tx = pool.begin().await?;

    let story = UserStory::find_by_id(&mut *tx, story_id)
        .await?
        .ok_or_else(|| story_not_found(story_id))?;

    if project_id_of(&mut tx, &story).await? != sprint.project_id {
        return Err(ServiceError::invalid(
            "sprint_id",
            "Sprint belongs to a different project",
        ));
    }

    let backlog = SprintBacklog::get_or_create(&mut tx, sprint.id).await?;
    let moved = UserStory::set_backlog(&mut *tx, story_id, BacklogRef::Sprint(backlog.id))
        .await?
        .ok_or_else(|| story_not_found(story_id))?;
    tx.commit().await?;

    info!(story_id = %story_id, sprint_id = %sprint.id, "User story moved to sprint backlog");
    Ok(moved)
}

/// Moves a story back to its project's product backlog
///
/// # Errors
///
/// `Validation` if `project` is not the story's project.
pub async fn move_to_product_backlog(pool: &PgPool, story_id: Uuid, project: &Project) -> ServiceResult<UserStory> {
    let mut tx = pool.begin().await?;

    let story = UserStory::find_by_id(&mut *tx, story_id)
        .await?
        .ok_or_else(|| story_not_found(story_id))?;

    if project_id_of(&mut tx, &story).await? != project.id {
        return Err(ServiceError::invalid(
            "project_id",
            "User story belongs to a different project",
        ));
    }

    let backlog = ProductBacklog::get_or_create(&mut tx, project.id).await?;
    let moved = UserStory::set_backlog(&mut *tx, story_id, BacklogRef::Product(backlog.id))
        .await?
        .ok_or_else(|| story_not_found(story_id))?;
    tx.commit().await?;

    info!(story_id = %story_id, project_id = %project.id, "User story moved to product backlog");
    Ok(moved)
}

/// Applies a partial update; the merged story is validated before writing
pub async fn update_story(pool: &PgPool, id: Uuid, update: &UpdateStory) -> ServiceResult<UserStory> {
    let mut tx = pool.begin().await?;

    let current = UserStory::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| story_not_found(id))?;

    let fields = update.apply_to(&current);
    fields.validate()?;

    let story = UserStory::update_fields(&mut *tx, id, &fields)
        .await?
        .ok_or_else(|| story_not_found(id))?;
    tx.commit().await?;

    info!(story_id = %id, "User story updated");
    Ok(story)
}

pub async fn delete_story(pool: &PgPool, id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;
    if !UserStory::delete(&mut *tx, id).await? {
        return Err(story_not_found(id));
    }
    tx.commit().await?;

    info!(story_id = %id, "User story deleted");
    Ok(())
}
