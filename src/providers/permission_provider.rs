use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::config::{begin_transaction, commit_transaction};
use crate::errors::InternalError;
use crate::stores::RoleStore;
use crate::types::db::role;
use crate::types::internal::permission::{
    Permission, PermissionSet, DEFAULT_ROLES, ROLE_ADMINISTRATOR, ROLE_USER,
};

/// Role bootstrap and permission grants
#[derive(Debug, Default)]
pub struct PermissionProvider {
    role_store: Arc<RoleStore>,
}

impl PermissionProvider {
    pub fn new(role_store: Arc<RoleStore>) -> Self {
        Self { role_store }
    }

    /// Create or re-sync every default role
    ///
    /// Safe to run on every startup: roles are looked up by name before
    /// insert and their mask is rebuilt from the static table, so repeated
    /// runs neither duplicate roles nor accumulate bits. Runs in a single
    /// transaction.
    pub async fn seed_default_roles(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<role::Model>, InternalError> {
        let txn = begin_transaction(db).await?;
        let mut seeded = Vec::with_capacity(DEFAULT_ROLES.len());

        for definition in DEFAULT_ROLES {
            let permissions = PermissionSet::from_permissions(definition.permissions);

            let role = match self.role_store.find_by_name(&txn, definition.name).await? {
                Some(existing) if existing.permissions == permissions.bits() => existing,
                Some(existing) => {
                    tracing::info!(
                        role = definition.name,
                        from = existing.permissions,
                        to = permissions.bits(),
                        "Resetting role permissions"
                    );
                    self.role_store.save_permissions(&txn, existing, permissions).await?
                }
                None => {
                    tracing::info!(role = definition.name, mask = permissions.bits(), "Creating role");
                    self.role_store.insert(&txn, definition.name, permissions).await?
                }
            };
            seeded.push(role);
        }

        commit_transaction(txn).await?;

        Ok(seeded)
    }

    pub async fn add_permission(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
        perm: Permission,
    ) -> Result<role::Model, InternalError> {
        let mut permissions = role.permission_set();
        if permissions.contains(perm) {
            return Ok(role);
        }
        permissions.add(perm);
        self.role_store.save_permissions(conn, role, permissions).await
    }

    pub async fn remove_permission(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
        perm: Permission,
    ) -> Result<role::Model, InternalError> {
        let mut permissions = role.permission_set();
        if !permissions.contains(perm) {
            return Ok(role);
        }
        permissions.remove(perm);
        self.role_store.save_permissions(conn, role, permissions).await
    }

    pub async fn reset_permissions(
        &self,
        conn: &impl ConnectionTrait,
        role: role::Model,
    ) -> Result<role::Model, InternalError> {
        self.role_store
            .save_permissions(conn, role, PermissionSet::empty())
            .await
    }

    pub fn has_permission(role: &role::Model, perm: Permission) -> bool {
        role.has_permission(perm)
    }

    /// Role name a new user receives; decided once at creation
    pub fn default_role_name(email: Option<&str>, admin_email: Option<&str>) -> &'static str {
        match (email, admin_email) {
            (Some(email), Some(admin)) if email == admin => ROLE_ADMINISTRATOR,
            _ => ROLE_USER,
        }
    }
}
