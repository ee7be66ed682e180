/// Project endpoints
///
/// - `GET /v1/projects?page=` - projects the caller owns or belongs to
/// - `POST /v1/projects` - create (requires `add_project`)
/// - `GET /v1/projects/:id` - detail with the caller's role
/// - `PUT /v1/projects/:id` - update name/description
/// - `DELETE /v1/projects/:id`, `POST /v1/projects/:id/delete` - delete

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::CurrentUser,
    routes::PageQuery,
};
use axum::{extract::State, http::StatusCode, Json};
use scrumflow_shared::{
    auth::authorization::{
        can_delete, can_manage, require_capability, require_delete, require_manage, require_member, Capability,
        ProjectRole,
    },
    models::project::{Project, ProjectFields, UpdateProject},
    pagination::Page,
    services::projects,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub role: ProjectRole,
    pub can_manage: bool,
    pub can_delete: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedProject {
    pub id: Uuid,
    pub name: String,
}

pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<Project>>> {
    require_capability(&principal, Capability::ViewProject)?;

    let page = projects::list_visible_projects(&state.db, principal.id(), query.page.as_deref()).await?;
    Ok(Json(page))
}

pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(fields): AppJson<ProjectFields>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    require_capability(&principal, Capability::AddProject)?;

    let project = projects::create_project(&state.db, principal.id(), fields).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let project = projects::get_project(&state.db, id).await?;
    let role = require_member(&state.db, &project, &principal).await?;
    let manage = can_manage(&state.db, &project, &principal).await?;

    Ok(Json(ProjectDetail {
        can_delete: can_delete(&project, &principal),
        can_manage: manage,
        role,
        project,
    }))
}

pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<UpdateProject>,
) -> ApiResult<Json<Project>> {
    let project = projects::get_project(&state.db, id).await?;
    require_manage(&state.db, &project, &principal).await?;

    let updated = projects::update_project(&state.db, project.id, &update).await?;
    Ok(Json(updated))
}

/// Serves both `DELETE /projects/:id` and `POST /projects/:id/delete`
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<DeletedProject>> {
    let project = projects::get_project(&state.db, id).await?;
    require_delete(&project, &principal)?;

    let name = projects::delete_project(&state.db, project.id).await?;
    Ok(Json(DeletedProject { id, name }))
}
