/// Project service
///
/// # Example
///
/// ```no_run
/// use scrumflow_shared::models::project::ProjectFields;
/// use scrumflow_shared::services::projects;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let project = projects::create_project(
///     &pool,
///     owner_id,
///     ProjectFields { name: "Alpha".into(), description: String::new() },
/// )
/// .await?;
///
/// let page = projects::list_visible_projects(&pool, owner_id, Some("1")).await?;
/// assert_eq!(page.items[0].id, project.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::auth::authorization::ProjectRole;
use crate::error::{ServiceError, ServiceResult};
use crate::models::project::{Project, ProjectFields, UpdateProject};
use crate::models::project_member::ProjectMember;
use crate::models::user::{User, UserSummary};
use crate::pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE};

/// A user with access to a project, tagged with how they got it
#[derive(Debug, Clone, Serialize)]
pub struct ProjectUser {
    #[serde(flatten)]
    pub user: UserSummary,

    /// `owner` or `member`
    pub role: ProjectRole,

    /// Project creation time for the owner, membership time otherwise
    pub joined_at: DateTime<Utc>,
}

/// Roster of a project: the owner first, then members in join order
#[derive(Debug, Clone, Serialize)]
pub struct ProjectUsers {
    pub project_id: Uuid,
    pub project_name: String,
    pub users: Vec<ProjectUser>,
}

pub(crate) fn project_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Project with id {} not found", id))
}

/// Lists the projects a user owns or belongs to, newest first
///
/// `page` is the raw query value; see [`PageRequest`] for how it resolves.
pub async fn list_visible_projects(
    pool: &PgPool,
    user_id: Uuid,
    page: Option<&str>,
) -> ServiceResult<Page<Project>> {
    let request = PageRequest::parse(page, DEFAULT_PAGE_SIZE);

    let total = Project::count_visible(pool, user_id).await?;
    let number = request.resolve(total);
    let items = Project::list_visible(pool, user_id, request.page_size(), request.offset(number)).await?;

    debug!(user_id = %user_id, page = number, total, "Listed visible projects");
    Ok(Page::new(items, &request, number, total))
}

pub async fn get_project(pool: &PgPool, id: Uuid) -> ServiceResult<Project> {
    Project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))
}

/// Creates a project owned by `owner_id`
pub async fn create_project(pool: &PgPool, owner_id: Uuid, fields: ProjectFields) -> ServiceResult<Project> {
    fields.validate()?;

    let mut tx = pool.begin().await?;
    let project = Project::create(&mut *tx, owner_id, &fields).await?;
    tx.commit().await?;

    info!(project_id = %project.id, owner_id = %owner_id, "Project created");
    Ok(project)
}

/// Applies a partial update; the merged fields are validated as a whole
pub async fn update_project(pool: &PgPool, id: Uuid, update: &UpdateProject) -> ServiceResult<Project> {
    let mut tx = pool.begin().await?;

    let current = Project::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;

    let fields = update.apply_to(&current);
    fields.validate()?;

    let project = Project::update(&mut *tx, id, &fields)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    tx.commit().await?;

    info!(project_id = %id, "Project updated");
    Ok(project)
}

/// Deletes a project and everything under it, returning its name
pub async fn delete_project(pool: &PgPool, id: Uuid) -> ServiceResult<String> {
    let mut tx = pool.begin().await?;
    let name = Project::delete(&mut *tx, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    tx.commit().await?;

    info!(project_id = %id, name = %name, "Project deleted");
    Ok(name)
}

/// Every project a user owns or belongs to
///
/// # Errors
///
/// `NotFound` if the user does not exist.
pub async fn list_user_projects(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<Project>> {
    if !User::exists(pool, user_id).await? {
        return Err(ServiceError::NotFound(format!("User with id {} not found", user_id)));
    }

    Ok(Project::list_for_user(pool, user_id).await?)
}

/// The owner and members of a project
pub async fn list_project_users(pool: &PgPool, project_id: Uuid) -> ServiceResult<ProjectUsers> {
    let project = get_project(pool, project_id).await?;

    let owner = User::find_by_id(pool, project.owner_id).await?.ok_or_else(|| {
        ServiceError::InvariantViolation(format!(
            "project {} references missing owner {}",
            project.id, project.owner_id
        ))
    })?;

    let mut users = vec![ProjectUser {
        user: UserSummary::from(&owner),
        role: ProjectRole::Owner,
        joined_at: project.created_at,
    }];

    users.extend(
        ProjectMember::list_details(pool, project.id)
            .await?
            .into_iter()
            .map(|member| ProjectUser {
                user: UserSummary {
                    id: member.user_id,
                    username: member.username,
                    email: member.email,
                    first_name: member.first_name,
                    last_name: member.last_name,
                },
                role: ProjectRole::Member,
                joined_at: member.joined_at,
            }),
    );

    Ok(ProjectUsers {
        project_id: project.id,
        project_name: project.name,
        users,
    })
}
