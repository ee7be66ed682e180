/// User story endpoints
///
/// Every operation requires membership in the project the story resolves to.
///
/// - `GET|PUT|DELETE /v1/stories/:id`
/// - `POST /v1/stories/:id/move`
///
/// Move bodies:
///
/// ```json
/// { "to": "sprint", "sprint_id": "<uuid>" }
/// { "to": "product_backlog" }
/// ```

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
        project::Project,
        user_story::{UpdateStory, UserStory},
    },
    services::stories,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum MoveTarget {
    Sprint { sprint_id: Uuid },
    ProductBacklog,
}

/// Loads a story together with its project, checking membership
async fn member_story(pool: &PgPool, principal: &Principal, id: Uuid) -> ApiResult<(UserStory, Project)> {
    let story = stories::get_story(pool, id).await?;
    let project = stories::resolve_project(pool, &story).await?;
    require_member(pool, &project, principal).await?;

    Ok((story, project))
}

pub async fn get_story(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<UserStory>> {
    let (story, _) = member_story(&state.db, &principal, id).await?;
    Ok(Json(story))
}

pub async fn update_story(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<UpdateStory>,
) -> ApiResult<Json<UserStory>> {
    member_story(&state.db, &principal, id).await?;

    Ok(Json(stories::update_story(&state.db, id, &update).await?))
}

pub async fn delete_story(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    member_story(&state.db, &principal, id).await?;
    stories::delete_story(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_story(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(target): AppJson<MoveTarget>,
) -> ApiResult<Json<UserStory>> {
    let (story, project) = member_story(&state.db, &principal, id).await?;

    let moved = match target {
        MoveTarget::Sprint { sprint_id } => {
            let sprint = stories::get_sprint(&state.db, sprint_id).await?;
            stories::move_to_sprint(&state.db, story.id, &sprint).await?
        }
        MoveTarget::ProductBacklog => stories::move_to_product_backlog(&state.db, story.id, &project).await?,
    };

    Ok(Json(moved))
}
