use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::internal::UserError;
use crate::errors::{InternalError, TokenError};
use crate::providers::{NewUser, PasswordProvider, TokenProvider, UserProvider};
use crate::stores::{ProfileUpdate, UserStore};
use crate::types::db::user;
use crate::types::internal::principal::Principal;
use crate::types::internal::token::TokenPurpose;

/// Account coordinator: creation, confirmation, password and email changes
///
/// Token failures come back as `InternalError::Token`; callers that only
/// care whether the action happened can treat any error as "no".
pub struct AccountCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    user_provider: Arc<UserProvider>,
    token_provider: Arc<TokenProvider>,
    password_provider: Arc<PasswordProvider>,
}

impl AccountCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store.clone(),
            user_provider: app_data.user_provider.clone(),
            token_provider: app_data.token_provider.clone(),
            password_provider: app_data.password_provider.clone(),
        }
    }

    fn max_age(&self) -> u64 {
        self.token_provider.default_max_age_seconds()
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model, InternalError> {
        let txn = begin_transaction(&self.db).await?;
        let user = self.user_provider.create_user(&txn, new_user).await?;
        commit_transaction(txn).await?;
        Ok(user)
    }

    pub fn confirmation_token(&self, user: &user::Model) -> Result<String, InternalError> {
        self.token_provider.confirmation_token(user.id)
    }

    /// Mark the account confirmed if `token` was issued for it
    pub async fn confirm_account(&self, user_id: i32, token: &str) -> Result<user::Model, InternalError> {
        let user = self.user_store.get_by_id(&self.db, user_id).await?;

        self.token_provider
            .verify(&self.db, token, TokenPurpose::ConfirmAccount, user.id, self.max_age())
            .await?;

        if user.confirmed {
            return Ok(user);
        }

        let user = self.user_store.set_confirmed(&self.db, user).await?;
        tracing::info!(user_id = user.id, "Account confirmed");
        Ok(user)
    }

    /// Reset token for the account registered under `email`, if any
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, InternalError> {
        match self.user_store.find_by_email(&self.db, email).await? {
            Some(user) => Ok(Some(self.token_provider.reset_token(user.id)?)),
            None => {
                tracing::debug!("Password reset requested for unknown email");
                Ok(None)
            }
        }
    }

    /// Set a new password for the account named by a reset token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<user::Model, InternalError> {
        let payload = self.token_provider.decode_subject_at(
            token,
            TokenPurpose::ResetPassword,
            self.max_age(),
            Utc::now(),
        )?;

        let user = self.user_store.get_by_id(&self.db, payload.subject_id).await?;
        let password_hash = self.password_provider.hash(new_password)?;
        let user = self
            .user_store
            .set_password_hash(&self.db, user, password_hash)
            .await?;

        tracing::info!(user_id = user.id, "Password reset");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<user::Model, InternalError> {
        let user = self.user_store.get_by_id(&self.db, user_id).await?;

        if !self
            .password_provider
            .verify(old_password, user.password_hash.as_deref())?
        {
            return Err(UserError::IncorrectPassword.into());
        }

        let password_hash = self.password_provider.hash(new_password)?;
        self.user_store
            .set_password_hash(&self.db, user, password_hash)
            .await
    }

    pub async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool, InternalError> {
        let user = self.user_store.get_by_id(&self.db, user_id).await?;
        self.password_provider
            .verify(password, user.password_hash.as_deref())
    }

    /// Check the password and that `new_email` is free, then issue a
    /// change-email token
    pub async fn request_email_change(
        &self,
        user_id: i32,
        password: &str,
        new_email: &str,
    ) -> Result<String, InternalError> {
        if !self.verify_password(user_id, password).await? {
            return Err(UserError::IncorrectPassword.into());
        }

        if self.user_store.find_by_email(&self.db, new_email).await?.is_some() {
            return Err(UserError::DuplicateEmail {
                email: new_email.to_string(),
            }
            .into());
        }

        self.token_provider.change_email_token(user_id, new_email)
    }

    /// Apply the email address carried by a change-email token
    ///
    /// The availability check and the write share one transaction; an
    /// address claimed concurrently still surfaces as `EmailTaken`.
    pub async fn change_email(&self, user_id: i32, token: &str) -> Result<user::Model, InternalError> {
        let txn = begin_transaction(&self.db).await?;
        let user = self.user_store.get_by_id(&txn, user_id).await?;

        let new_email = self
            .token_provider
            .verify_change_email(&txn, token, user.id, self.max_age())
            .await?;

        let user = match self.user_store.set_email(&txn, user, new_email).await {
            Ok(user) => user,
            Err(InternalError::User(UserError::DuplicateEmail { email })) => {
                tracing::warn!(user_id, "Email address taken before change was applied");
                return Err(TokenError::EmailTaken { email }.into());
            }
            Err(e) => return Err(e),
        };
        commit_transaction(txn).await?;

        tracing::info!(user_id = user.id, "Email address changed");
        Ok(user)
    }

    /// Record activity for a signed-in user
    pub async fn ping(&self, user_id: i32) -> Result<user::Model, InternalError> {
        let user = self.user_store.get_by_id(&self.db, user_id).await?;
        self.user_store.touch_last_seen(&self.db, user).await
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        profile: ProfileUpdate,
    ) -> Result<user::Model, InternalError> {
        let user = self.user_store.get_by_id(&self.db, user_id).await?;
        self.user_store.update_profile(&self.db, user, profile).await
    }

    /// Resolve the acting principal; unknown ids are anonymous
    pub async fn load_principal(&self, user_id: Option<i32>) -> Result<Principal, InternalError> {
        let Some(user_id) = user_id else {
            return Ok(Principal::Anonymous);
        };

        Ok(match self.user_store.find_with_role(&self.db, user_id).await? {
            Some((user, role)) => Principal::member(user, role),
            None => Principal::Anonymous,
        })
    }
}
