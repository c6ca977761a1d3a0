use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::app_data::AppData;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::InternalError;
use crate::providers::{Mailer, NewUser, UserProvider};
use crate::stores::UserStore;
use crate::types::db::user;

pub const NEW_USER_SUBJECT: &str = "New User";
pub const NEW_USER_TEMPLATE: &str = "mail/new_user";

/// Result of a visitor giving their name
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: user::Model,
    /// The username was already registered before this visit
    pub known: bool,
}

/// Registration coordinator - handles the name-capture flow
pub struct RegistrationCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    user_provider: Arc<UserProvider>,
    mailer: Arc<dyn Mailer>,
}

impl RegistrationCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store.clone(),
            user_provider: app_data.user_provider.clone(),
            mailer: app_data.mailer.clone(),
        }
    }

    /// Look up a visitor by username, registering them on first sight
    ///
    /// New registrations notify the administrator when an admin address is
    /// configured. A failed notification never fails the registration.
    pub async fn register_visitor(&self, username: &str) -> Result<Registration, InternalError> {
        if let Some(user) = self.user_store.find_by_username(&self.db, username).await? {
            tracing::debug!(user_id = user.id, "Returning visitor");
            return Ok(Registration { user, known: true });
        }

        let txn = begin_transaction(&self.db).await?;
        let user = self
            .user_provider
            .create_user(&txn, NewUser::with_username(username))
            .await?;
        commit_transaction(txn).await?;

        self.notify_admin(&user).await;

        Ok(Registration { user, known: false })
    }

    async fn notify_admin(&self, user: &user::Model) {
        let Some(admin_email) = self.user_provider.admin_email() else {
            return;
        };

        let context = json!({
            "user": {
                "id": user.id,
                "username": user.username,
                "email": user.email,
            }
        });

        if let Err(e) = self
            .mailer
            .send_email(admin_email, NEW_USER_SUBJECT, NEW_USER_TEMPLATE, context)
            .await
        {
            tracing::error!(user_id = user.id, error = %e, "Failed to notify admin of new user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{setup_test_app_data, RecordingMailer};

    #[tokio::test]
    async fn test_notification_context_carries_user() {
        let mailer = Arc::new(RecordingMailer::default());
        let app_data = setup_test_app_data(Some("admin@example.com"), mailer.clone()).await;
        let coordinator = RegistrationCoordinator::new(app_data);

        let registration = coordinator.register_visitor("susan").await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].context["user"]["id"], registration.user.id);
        assert_eq!(sent[0].context["user"]["username"], "susan");
        assert!(sent[0].context["user"]["email"].is_null());
    }

    #[tokio::test]
    async fn test_failed_notification_is_swallowed() {
        let mailer = Arc::new(RecordingMailer::failing());
        let app_data = setup_test_app_data(Some("admin@example.com"), mailer.clone()).await;
        let coordinator = RegistrationCoordinator::new(app_data);

        assert!(coordinator.register_visitor("susan").await.is_ok());
        assert_eq!(mailer.sent().len(), 1);
    }
}
