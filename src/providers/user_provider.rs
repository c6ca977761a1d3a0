use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::internal::UserError;
use crate::errors::InternalError;
use crate::providers::{PasswordProvider, PermissionProvider};
use crate::stores::{RoleStore, UserInsert, UserStore};
use crate::types::db::user;

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl NewUser {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            password: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// User lifecycle operations shared by the coordinators
pub struct UserProvider {
    user_store: Arc<UserStore>,
    role_store: Arc<RoleStore>,
    password_provider: Arc<PasswordProvider>,
    admin_email: Option<String>,
}

impl UserProvider {
    pub fn new(
        user_store: Arc<UserStore>,
        role_store: Arc<RoleStore>,
        password_provider: Arc<PasswordProvider>,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            user_store,
            role_store,
            password_provider,
            admin_email,
        }
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.admin_email.as_deref()
    }

    pub async fn username_in_use(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<bool, InternalError> {
        Ok(self.user_store.find_by_username(conn, username).await?.is_some())
    }

    /// Create a user with its default role
    ///
    /// The role is chosen once, here: Administrator when the email matches
    /// the configured admin address, User otherwise. If that role has not
    /// been seeded yet the user is created without one.
    pub async fn create_user(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
    ) -> Result<user::Model, InternalError> {
        if self.username_in_use(conn, &new_user.username).await? {
            return Err(UserError::DuplicateUsername {
                username: new_user.username,
            }
            .into());
        }

        if let Some(email) = new_user.email.as_deref() {
            if self.user_store.find_by_email(conn, email).await?.is_some() {
                return Err(UserError::DuplicateEmail {
                    email: email.to_string(),
                }
                .into());
            }
        }

        let role_name =
            PermissionProvider::default_role_name(new_user.email.as_deref(), self.admin_email());
        let role_id = match self.role_store.find_by_name(conn, role_name).await? {
            Some(role) => Some(role.id),
            None => {
                tracing::warn!(role = role_name, "Default role missing, creating user without a role");
                None
            }
        };

        let password_hash = match new_user.password.as_deref() {
            Some(password) => Some(self.password_provider.hash(password)?),
            None => None,
        };

        let user = self
            .user_store
            .insert(
                conn,
                UserInsert {
                    username: new_user.username,
                    email: new_user.email,
                    role_id,
                    password_hash,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = role_name, "Created user");

        Ok(user)
    }
}
