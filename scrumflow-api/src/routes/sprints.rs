/// Sprint endpoints
///
/// - `GET /v1/projects/:id/sprints` - sprints of a project (members)
/// - `POST /v1/projects/:id/sprints` - create (managers)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{AppJson, AppPath},
    middleware::auth::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use scrumflow_shared::{
    auth::authorization::{require_manage, require_member},
    models::sprint::{Sprint, SprintFields},
    services::{projects, stories},
};
use uuid::Uuid;

pub async fn list_sprints(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<Sprint>>> {
    let project = projects::get_project(&state.db, id).await?;
    require_member(&state.db, &project, &principal).await?;

    Ok(Json(stories::list_sprints(&state.db, project.id).await?))
}

pub async fn create_sprint(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(fields): AppJson<SprintFields>,
) -> ApiResult<(StatusCode, Json<Sprint>)> {
    let project = projects::get_project(&state.db, id).await?;
    require_manage(&state.db, &project, &principal).await?;

    let sprint = stories::create_sprint(&state.db, project.id, fields).await?;
    Ok((StatusCode::CREATED, Json(sprint)))
}
