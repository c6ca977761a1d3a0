use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::errors::InternalError;
use crate::types::db::role::{self, ActiveModel, Entity as Role};
use crate::types::internal::permission::PermissionSet;

/// Data access for the `roles` table
#[derive(Debug, Default)]
pub struct RoleStore;

impl RoleStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_name(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
    ) -> Result<Option<role::Model>, InternalError> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_role_by_name", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        role_id: i32,
    ) -> Result<Option<role::Model>, InternalError> {
        Role::find_by_id(role_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_role_by_id", e))
    }

    pub async fn list(&self, conn: &impl ConnectionTrait) -> Result<Vec<role::Model>, InternalError> {
        Role::find()
            .order_by_asc(role::Column::Id)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_roles", e))
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        name: &str,
        permissions: PermissionSet,
    ) -> Result<role::Model, InternalError> {
        let new_role = ActiveModel {
            name: Set(name.to_string()),
            permissions: Set(permissions.bits()),
            ..Default::default()
        };

        new_role
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_role", e))
    }

    /// Overwrite a role's mask, last write wins
    pub async fn save_permissions(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
        permissions: PermissionSet,
    ) -> Result<role::Model, InternalError> {
        let mut active: ActiveModel = role.into();
        active.permissions = Set(permissions.bits());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("save_role_permissions", e))
    }
}
