/// Backlog endpoints
///
/// Any project member may read a backlog and add stories to it. The backlog
/// itself is created on first access.
///
/// - `GET|POST /v1/projects/:id/backlog` - product backlog
/// - `GET|POST /v1/sprints/:id/backlog` - sprint backlog

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{AppJson, AppPath},
    middleware::auth::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use scrumflow_shared::{
    auth::authorization::{require_member, Principal},
    models::{
        sprint::Sprint,
        user_story::{StoryFields, UserStory},
    },
    services::{projects, stories},
};
use sqlx::PgPool;
use uuid::Uuid;

/// Loads a sprint and checks the caller belongs to its project
async fn member_sprint(pool: &PgPool, principal: &Principal, sprint_id: Uuid) -> ApiResult<Sprint> {
    let sprint = stories::get_sprint(pool, sprint_id).await?;
    let project = projects::get_project(pool, sprint.project_id).await?;
    require_member(pool, &project, principal).await?;

    Ok(sprint)
}

pub async fn product_backlog(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<UserStory>>> {
    let project = projects::get_project(&state.db, id).await?;
    require_member(&state.db, &project, &principal).await?;

    Ok(Json(stories::list_product_backlog(&state.db, project.id).await?))
}

pub async fn create_in_product_backlog(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(fields): AppJson<StoryFields>,
) -> ApiResult<(StatusCode, Json<UserStory>)> {
    let project = projects::get_project(&state.db, id).await?;
    require_member(&state.db, &project, &principal).await?;

    let story = stories::create_in_product_backlog(&state.db, project.id, fields).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn sprint_backlog(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<UserStory>>> {
    let sprint = member_sprint(&state.db, &principal, id).await?;

    Ok(Json(stories::list_sprint_backlog(&state.db, &sprint).await?))
}

pub async fn create_in_sprint_backlog(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(fields): AppJson<StoryFields>,
) -> ApiResult<(StatusCode, Json<UserStory>)> {
    let sprint = member_sprint(&state.db, &principal, id).await?;

    let story = stories::create_in_sprint_backlog(&state.db, &sprint, fields).await?;
    Ok((StatusCode::CREATED, Json(story)))
}
