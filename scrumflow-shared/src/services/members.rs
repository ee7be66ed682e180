/// Project membership service
///
/// The (project, user) pair is unique in storage, so a concurrent duplicate
/// add loses at the constraint and comes back as `Conflict` rather than
/// producing a second row.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{is_foreign_key_violation, is_unique_violation, ServiceError, ServiceResult};
use crate::models::project::Project;
use crate::models::project_member::{MemberDetail, ProjectMember};
use crate::models::user::User;
use crate::pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE};

use super::projects::project_not_found;

/// Lists one page of a project's members in join order
pub async fn list_members_page(
    pool: &PgPool,
    project_id: Uuid,
    page: Option<&str>,
) -> ServiceResult<Page<MemberDetail>> {
    let request = PageRequest::parse(page, DEFAULT_PAGE_SIZE);

    let total = ProjectMember::count_by_project(pool, project_id).await?;
    let number = request.resolve(total);
    let items =
        ProjectMember::list_page(pool, project_id, request.page_size(), request.offset(number)).await?;

    debug!(project_id = %project_id, page = number, total, "Listed project members");
    Ok(Page::new(items, &request, number, total))
}

/// Adds a user to a project
///
/// # Errors
///
/// - `NotFound` if the user or project does not exist
/// - `Conflict` if the user is the owner or already a member
pub async fn add_member(pool: &PgPool, project: &Project, user_id: Uuid) -> ServiceResult<ProjectMember> {
    if project.owner_id == user_id {
        return Err(ServiceError::Conflict(
            "The project owner is already a member".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let user = User::find_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User with id {} not found", user_id)))?;

    let member = match ProjectMember::create(&mut *tx, project.id, user.id).await {
        Ok(member) => member,
        Err(e) if is_unique_violation(&e) => {
            return Err(ServiceError::Conflict(format!(
                "{} is already a member of this project",
                user.username
            )));
        }
        Err(e) if is_foreign_key_violation(&e) => return Err(project_not_found(project.id)),
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;

    info!(project_id = %project.id, user_id = %user.id, member_id = %member.id, "Member added");
    Ok(member)
}

/// Finds a membership of this exact project
pub async fn get_member(pool: &PgPool, member_id: Uuid, project_id: Uuid) -> ServiceResult<ProjectMember> {
    ProjectMember::find_in_project(pool, member_id, project_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Member with id {} not found", member_id)))
}

/// Removes a membership and returns the removed user's username
///
/// Stories and other memberships are untouched.
pub async fn remove_member(pool: &PgPool, member: &ProjectMember) -> ServiceResult<String> {
    let mut tx = pool.begin().await?;
    let username = ProjectMember::delete_returning_username(&mut *tx, member.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Member with id {} not found", member.id)))?;
    tx.commit().await?;

    info!(project_id = %member.project_id, member_id = %member.id, username = %username, "Member removed");
    Ok(username)
}
