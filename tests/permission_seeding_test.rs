mod common;

use std::sync::Arc;

use identity_core::coordinators::AccountCoordinator;
use identity_core::providers::{LogMailer, NewUser, PermissionProvider};
use identity_core::types::internal::permission::{Permission, PermissionSet};

#[tokio::test]
async fn test_seeding_creates_default_masks() {
    let app_data = common::setup_app_data(None, Arc::new(LogMailer)).await;

    let roles = app_data.role_store.list(&app_data.db).await.unwrap();
    let masks: Vec<(&str, i32)> = roles
        .iter()
        .map(|role| (role.name.as_str(), role.permissions))
        .collect();

    assert_eq!(masks, vec![("User", 7), ("Moderator", 15), ("Administrator", 31)]);
}

#[tokio::test]
async fn test_seeding_twice_is_idempotent() {
    let app_data = common::setup_app_data(None, Arc::new(LogMailer)).await;

    let first = app_data.role_store.list(&app_data.db).await.unwrap();
    app_data
        .permission_provider
        .seed_default_roles(&app_data.db)
        .await
        .unwrap();
    let second = app_data.role_store.list(&app_data.db).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_seeding_resets_drifted_mask() {
    let app_data = common::setup_app_data(None, Arc::new(LogMailer)).await;
    let provider = &app_data.permission_provider;

    let user_role = app_data
        .role_store
        .find_by_name(&app_data.db, "User")
        .await
        .unwrap()
        .unwrap();
    let drifted = provider
        .add_permission(&app_data.db, user_role, Permission::Admin)
        .await
        .unwrap();
    assert_eq!(drifted.permissions, 23);

    provider.seed_default_roles(&app_data.db).await.unwrap();

    let user_role = app_data
        .role_store
        .find_by_name(&app_data.db, "User")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_role.permissions, 7);
}

#[tokio::test]
async fn test_add_and_remove_are_idempotent() {
    let app_data = common::setup_app_data(None, Arc::new(LogMailer)).await;
    let provider = &app_data.permission_provider;
    let db = &app_data.db;

    let role = app_data.role_store.find_by_name(db, "User").await.unwrap().unwrap();

    let role = provider.add_permission(db, role, Permission::Write).await.unwrap();
    assert_eq!(role.permissions, 7);

    let role = provider.remove_permission(db, role, Permission::Moderate).await.unwrap();
    assert_eq!(role.permissions, 7);

    let role = provider.remove_permission(db, role, Permission::Write).await.unwrap();
    assert_eq!(role.permissions, 3);
    assert!(!PermissionProvider::has_permission(&role, Permission::Write));

    let role = provider.reset_permissions(db, role).await.unwrap();
    assert_eq!(role.permission_set(), PermissionSet::empty());
}

#[tokio::test]
async fn test_principal_permissions_follow_role() {
    let app_data = common::setup_app_data(Some(common::ADMIN_EMAIL), Arc::new(LogMailer)).await;
    let coordinator = AccountCoordinator::new(app_data.clone());

    let admin = coordinator
        .create_user(NewUser::with_username("boss").email(common::ADMIN_EMAIL))
        .await
        .unwrap();
    let member = coordinator
        .create_user(NewUser::with_username("john").email("john@example.com"))
        .await
        .unwrap();

    let admin = coordinator.load_principal(Some(admin.id)).await.unwrap();
    let member = coordinator.load_principal(Some(member.id)).await.unwrap();
    let anonymous = coordinator.load_principal(None).await.unwrap();
    let unknown = coordinator.load_principal(Some(9999)).await.unwrap();

    assert!(admin.is_administrator());
    assert!(admin.can(Permission::Moderate));

    assert!(member.can(Permission::Write));
    assert!(!member.can(Permission::Moderate));
    assert!(!member.is_administrator());

    assert!(anonymous.is_anonymous());
    assert!(!anonymous.can(Permission::Follow));
    assert!(unknown.is_anonymous());
}
