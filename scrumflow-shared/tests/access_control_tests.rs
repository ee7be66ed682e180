/// Integration tests for project access predicates
///
/// These tests require a running PostgreSQL database at `DATABASE_URL`.

mod common;

use common::{create_superuser, create_user, project_fields, setup_pool};
use scrumflow_shared::auth::authorization::{
    can_delete, can_manage, is_member, is_owner, project_role, require_manage, require_member, AuthzError,
    Principal, ProjectRole,
};
use scrumflow_shared::error::ServiceError;
use scrumflow_shared::services::{members, projects};
use scrumflow_shared::models::user::{EDITOR_GROUP, MEMBER_GROUP};
use uuid::Uuid;

#[tokio::test]
async fn test_owner_is_always_a_member() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();

    assert!(is_owner(&project, owner.id));
    assert!(is_member(&pool, &project, owner.id).await.unwrap());

    let principal = Principal::load(&pool, owner.id).await.unwrap();
    assert_eq!(project_role(&pool, &project, &principal).await.unwrap(), ProjectRole::Owner);
    assert!(can_manage(&pool, &project, &principal).await.unwrap());
    assert!(can_delete(&project, &principal));
}

#[tokio::test]
async fn test_member_can_view_but_not_manage_or_delete() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let member = create_user(&pool, "member", &[MEMBER_GROUP]).await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();
    members::add_member(&pool, &project, member.id).await.unwrap();

    let principal = Principal::load(&pool, member.id).await.unwrap();

    assert_eq!(require_member(&pool, &project, &principal).await.unwrap(), ProjectRole::Member);
    assert!(!can_manage(&pool, &project, &principal).await.unwrap());
    assert!(!can_delete(&project, &principal));
}

#[tokio::test]
async fn test_editor_manages_only_projects_they_belong_to() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let editor = create_user(&pool, "editor", &[EDITOR_GROUP]).await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();

    let principal = Principal::load(&pool, editor.id).await.unwrap();

    assert_eq!(project_role(&pool, &project, &principal).await.unwrap(), ProjectRole::None);
    assert!(!can_manage(&pool, &project, &principal).await.unwrap());
    assert!(matches!(
        require_manage(&pool, &project, &principal).await,
        Err(AuthzError::CannotManage(_))
    ));

    members::add_member(&pool, &project, editor.id).await.unwrap();

    assert_eq!(project_role(&pool, &project, &principal).await.unwrap(), ProjectRole::Editor);
    assert!(can_manage(&pool, &project, &principal).await.unwrap());
    assert!(!can_delete(&project, &principal));
}

#[tokio::test]
async fn test_outsider_is_rejected() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let outsider = create_user(&pool, "outsider", &[MEMBER_GROUP]).await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();

    let principal = Principal::load(&pool, outsider.id).await.unwrap();

    let err = require_member(&pool, &project, &principal).await.unwrap_err();
    assert!(matches!(err, AuthzError::NotMember(id) if id == project.id));
    assert!(matches!(ServiceError::from(err), ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn test_superuser_passes_every_check() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let admin = create_superuser(&pool, "admin").await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();

    let principal = Principal::load(&pool, admin.id).await.unwrap();

    assert!(!is_member(&pool, &project, admin.id).await.unwrap());
    assert!(require_member(&pool, &project, &principal).await.is_ok());
    assert!(can_manage(&pool, &project, &principal).await.unwrap());
    assert!(can_delete(&project, &principal));
}

#[tokio::test]
async fn test_principal_for_unknown_user() {
    let pool = setup_pool().await;
    let missing = Uuid::new_v4();

    let err = Principal::load(&pool, missing).await.unwrap_err();
    assert!(matches!(err, AuthzError::UnknownUser(id) if id == missing));
    assert!(matches!(ServiceError::from(err), ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_removed_member_loses_access() {
    let pool = setup_pool().await;
    let owner = create_user(&pool, "owner", &[EDITOR_GROUP]).await;
    let member = create_user(&pool, "member", &[MEMBER_GROUP]).await;
    let project = projects::create_project(&pool, owner.id, project_fields("Alpha"))
        .await
        .unwrap();

    let membership = members::add_member(&pool, &project, member.id).await.unwrap();
    assert!(is_member(&pool, &project, member.id).await.unwrap());

    members::remove_member(&pool, &membership).await.unwrap();
    assert!(!is_member(&pool, &project, member.id).await.unwrap());
}
