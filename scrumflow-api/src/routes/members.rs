/// Project membership endpoints
///
/// - `GET /v1/projects/:id/members?page=` - members, 10 per page
/// - `POST /v1/projects/:id/members` - add by `user_id` or `username`
/// - `DELETE /v1/projects/:id/members/:member_id` - remove

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::CurrentUser,
    routes::PageQuery,
};
use axum::{extract::State, http::StatusCode, Json};
use scrumflow_shared::{
    auth::authorization::{require_manage, require_member},
    error::FieldError,
    models::project_member::{MemberDetail, ProjectMember},
    pagination::Page,
    services::{members, projects, users},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies the user to add; `user_id` wins when both are given
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemovedMember {
    pub id: Uuid,
    pub username: String,
}

pub async fn list_members(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<MemberDetail>>> {
    let project = projects::get_project(&state.db, id).await?;
    require_member(&state.db, &project, &principal).await?;

    let page = members::list_members_page(&state.db, project.id, query.page.as_deref()).await?;
    Ok(Json(page))
}

pub async fn add_member(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    let project = projects::get_project(&state.db, id).await?;
    require_manage(&state.db, &project, &principal).await?;

    let user_id = match (req.user_id, req.username.as_deref()) {
        (Some(user_id), _) => user_id,
        (None, Some(username)) if !username.trim().is_empty() => users::find_user_id(&state.db, username).await?,
        _ => {
            return Err(ApiError::ValidationError(vec![FieldError::new(
                "user_id",
                "Either user_id or username is required",
            )]))
        }
    };

    let member = members::add_member(&state.db, &project, user_id).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppPath((id, member_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<Json<RemovedMember>> {
    let project = projects::get_project(&state.db, id).await?;
    require_manage(&state.db, &project, &principal).await?;

    let member = members::get_member(&state.db, member_id, project.id).await?;
    let username = members::remove_member(&state.db, &member).await?;

    Ok(Json(RemovedMember {
        id: member.id,
        username,
    }))
}
