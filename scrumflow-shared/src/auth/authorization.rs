/// Project access control
///
/// Every decision is computed from the database at request time; nothing is
/// cached on the token or across requests.
///
/// # Permission Model
///
/// 1. **Ownership**: each project has exactly one owner, who is always a member
/// 2. **Membership**: the owner, or a user with a `project_members` row
/// 3. **Management**: superusers, the owner, or members of the `editor` group
///    who are also project members
/// 4. **Deletion**: the owner or a superuser
/// 5. **Capabilities**: global, group-derived rights (view and create projects)
///
/// Handlers call one of the `require_*` guards before touching state; a
/// failed guard becomes `403 Forbidden`.
///
/// # Example
///
/// ```no_run
/// use scrumflow_shared::auth::authorization::{require_manage, Principal};
/// use scrumflow_shared::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let principal = Principal::load(&pool, user_id).await?;
/// let project = Project::find_by_id(&pool, project_id).await?.ok_or("not found")?;
///
/// require_manage(&pool, &project, &principal).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::project_member::ProjectMember;
use crate::models::user::{User, EDITOR_GROUP, MEMBER_GROUP};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("You are not a member of project {0}")]
    NotMember(Uuid),

    #[error("You cannot manage project {0}")]
    CannotManage(Uuid),

    #[error("Only the owner can delete project {0}")]
    CannotDelete(Uuid),

    #[error("Missing permission: {}", .0.as_str())]
    MissingCapability(Capability),

    /// The authenticated user no longer exists
    #[error("Unknown user {0}")]
    UnknownUser(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A caller's relationship to one project
///
/// Computed per request; ordered from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,

    /// Project member who is also in the `editor` group
    Editor,

    Member,

    /// No relationship to the project
    None,
}

impl ProjectRole {
    /// Derives the role from the three facts it depends on
    ///
    /// Editor group membership only counts for project members.
    pub fn resolve(is_owner: bool, is_member: bool, is_editor: bool) -> Self {
        match (is_owner, is_member, is_editor) {
            (true, _, _) => ProjectRole::Owner,
            (false, true, true) => ProjectRole::Editor,
            (false, true, false) => ProjectRole::Member,
            (false, false, _) => ProjectRole::None,
        }
    }

    pub fn is_member(&self) -> bool {
        !matches!(self, ProjectRole::None)
    }

    pub fn can_manage(&self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Editor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Editor => "editor",
            ProjectRole::Member => "member",
            ProjectRole::None => "none",
        }
    }
}

/// Global rights granted through groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// List and open projects (groups `member`, `editor`)
    ViewProject,

    /// Create projects (group `editor`)
    AddProject,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProject => "view_project",
            Capability::AddProject => "add_project",
        }
    }

    /// Groups that grant this capability
    pub fn granted_by(&self) -> &'static [&'static str] {
        match self {
            Capability::ViewProject => &[MEMBER_GROUP, EDITOR_GROUP],
            Capability::AddProject => &[EDITOR_GROUP],
        }
    }
}

/// The authenticated user with the groups loaded for this request
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub groups: Vec<String>,
}

impl Principal {
    /// Loads the user and their groups
    ///
    /// # Errors
    ///
    /// `AuthzError::UnknownUser` if the user was deleted after the token
    /// was issued.
    pub async fn load(pool: &PgPool, user_id: Uuid) -> Result<Self, AuthzError> {
        let user = User::find_by_id(pool, user_id)
            .await?
            .ok_or(AuthzError::UnknownUser(user_id))?;
        let groups = User::group_names(pool, user_id).await?;

        Ok(Self { user, groups })
    }

    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_superuser(&self) -> bool {
        self.user.is_superuser
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group == name)
    }

    pub fn is_editor(&self) -> bool {
        self.in_group(EDITOR_GROUP)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.is_superuser()
            || capability
                .granted_by()
                .iter()
                .any(|group| self.in_group(group))
    }
}

/// True iff `user_id` owns the project
pub fn is_owner(project: &Project, user_id: Uuid) -> bool {
    project.owner_id == user_id
}

/// True iff the user owns the project or holds a membership row in it
///
/// This is the only membership test; callers must not OR in
/// [`is_owner`] themselves.
pub async fn is_member<'e, E>(executor: E, project: &Project, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    if is_owner(project, user_id) {
        return Ok(true);
    }

    ProjectMember::exists(executor, project.id, user_id).await
}

/// Computes the caller's role in a project
pub async fn project_role<'e, E>(
    executor: E,
    project: &Project,
    principal: &Principal,
) -> Result<ProjectRole, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let owner = is_owner(project, principal.id());
    let member = owner || is_member(executor, project, principal.id()).await?;

    Ok(ProjectRole::resolve(owner, member, principal.is_editor()))
}

/// True iff the caller may edit the project and manage its members
///
/// An editor who is not a member of this project gets `false`.
pub async fn can_manage<'e, E>(executor: E, project: &Project, principal: &Principal) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    if principal.is_superuser() || is_owner(project, principal.id()) {
        return Ok(true);
    }

    if !principal.is_editor() {
        return Ok(false);
    }

    is_member(executor, project, principal.id()).await
}

/// True iff the caller may delete the project
pub fn can_delete(project: &Project, principal: &Principal) -> bool {
    principal.is_superuser() || is_owner(project, principal.id())
}

/// Requires project membership; superusers pass too
///
/// Returns the caller's role so handlers can report it without a second
/// lookup.
pub async fn require_member<'e, E>(
    executor: E,
    project: &Project,
    principal: &Principal,
) -> Result<ProjectRole, AuthzError>
where
    E: PgExecutor<'e>,
{
    let role = project_role(executor, project, principal).await?;

    if !role.is_member() && !principal.is_superuser() {
        return Err(AuthzError::NotMember(project.id));
    }

    Ok(role)
}

pub async fn require_manage<'e, E>(executor: E, project: &Project, principal: &Principal) -> Result<(), AuthzError>
where
    E: PgExecutor<'e>,
{
    if !can_manage(executor, project, principal).await? {
        return Err(AuthzError::CannotManage(project.id));
    }

    Ok(())
}

pub fn require_delete(project: &Project, principal: &Principal) -> Result<(), AuthzError> {
    if !can_delete(project, principal) {
        return Err(AuthzError::CannotDelete(project.id));
    }

    Ok(())
}

pub fn require_capability(principal: &Principal, capability: Capability) -> Result<(), AuthzError> {
    if !principal.has_capability(capability) {
        return Err(AuthzError::MissingCapability(capability));
    }

    Ok(())
}
