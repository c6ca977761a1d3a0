use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr};

use crate::errors::internal::UserError;
use crate::errors::InternalError;
use crate::types::db::role;
use crate::types::db::user::{self, ActiveModel, Entity as User};

/// Fields accepted when creating a user
#[derive(Debug, Clone)]
pub struct UserInsert {
    pub username: String,
    pub email: Option<String>,
    pub role_id: Option<i32>,
    pub password_hash: Option<String>,
}

/// Profile fields a user may edit; `None` leaves the column as is
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
}

/// Data access for the `users` table
#[derive(Debug, Default)]
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    /// Like `find_by_id` but a missing user is an error
    pub async fn get_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Result<user::Model, InternalError> {
        self.find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| UserError::UserIdNotFound { user_id }.into())
    }

    pub async fn find_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))
    }

    pub async fn find_by_username(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    /// Load a user together with the role it references
    pub async fn find_with_role(
        &self,
        conn: &impl ConnectionTrait,
        user_id: i32,
    ) -> Result<Option<(user::Model, Option<role::Model>)>, InternalError> {
        User::find_by_id(user_id)
            .find_also_related(role::Entity)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_with_role", e))
    }

    /// Insert a new user, stamping `member_since` and `last_seen`
    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_user: UserInsert,
    ) -> Result<user::Model, InternalError> {
        let now = Utc::now().timestamp();

        let active = ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            role_id: Set(new_user.role_id),
            password_hash: Set(new_user.password_hash),
            confirmed: Set(false),
            member_since: Set(Some(now)),
            last_seen: Set(Some(now)),
            ..Default::default()
        };

        active
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_user", e))
    }

    pub async fn set_confirmed(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
    ) -> Result<user::Model, InternalError> {
        let mut active: ActiveModel = user.into();
        active.confirmed = Set(true);
        Self::update(conn, active, "set_user_confirmed").await
    }

    pub async fn set_password_hash(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
        password_hash: String,
    ) -> Result<user::Model, InternalError> {
        let mut active: ActiveModel = user.into();
        active.password_hash = Set(Some(password_hash));
        Self::update(conn, active, "set_user_password_hash").await
    }

    /// Set a new address; one already owned by another user is
    /// `UserError::DuplicateEmail`
    pub async fn set_email(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
        email: String,
    ) -> Result<user::Model, InternalError> {
        let mut active: ActiveModel = user.into();
        active.email = Set(Some(email.clone()));

        active.update(conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail { email }.into(),
            _ => InternalError::database("set_user_email", e),
        })
    }

    pub async fn touch_last_seen(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
    ) -> Result<user::Model, InternalError> {
        let mut active: ActiveModel = user.into();
        active.last_seen = Set(Some(Utc::now().timestamp()));
        Self::update(conn, active, "touch_user_last_seen").await
    }

    pub async fn update_profile(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
        profile: ProfileUpdate,
    ) -> Result<user::Model, InternalError> {
        if profile.name.is_none() && profile.location.is_none() && profile.about_me.is_none() {
            return Ok(user);
        }

        let mut active: ActiveModel = user.into();
        if let Some(name) = profile.name {
            active.name = Set(Some(name));
        }
        if let Some(location) = profile.location {
            active.location = Set(Some(location));
        }
        if let Some(about_me) = profile.about_me {
            active.about_me = Set(Some(about_me));
        }
        Self::update(conn, active, "update_user_profile").await
    }

    async fn update(
        conn: &impl ConnectionTrait,
        active: ActiveModel,
        operation: &str,
    ) -> Result<user::Model, InternalError> {
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database(operation, e))
    }
}
