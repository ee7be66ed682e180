/// Read-only lookups
///
/// - `GET /api/users/:id/projects` - projects a user owns or belongs to
/// - `GET /api/projects/:id/users` - owner and members, with role and join time
///
/// Any authenticated caller may use these; both answer 404 when the user or
/// project does not exist.

use crate::{app::AppState, error::ApiResult, extract::AppPath, middleware::auth::CurrentUser};
use axum::{extract::State, Json};
use scrumflow_shared::{
    models::project::Project,
    services::projects::{self, ProjectUsers},
};
use uuid::Uuid;

pub async fn user_projects(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(user_id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(projects::list_user_projects(&state.db, user_id).await?))
}

pub async fn project_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<Json<ProjectUsers>> {
    Ok(Json(projects::list_project_users(&state.db, project_id).await?))
}
