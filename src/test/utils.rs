// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use migration::{IdentityMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;

use crate::app_data::AppData;
use crate::config::{BootstrapSettings, SecretManager};
use crate::providers::{MailError, Mailer};

pub const TEST_SECRET_KEY: &str = "test-secret-key-minimum-16";
pub const TEST_PEPPER: &str = "test-pepper-for-unit-tests";

/// Fresh in-memory database with all migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    IdentityMigrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    Arc::new(SecretManager::from_values(TEST_SECRET_KEY, TEST_PEPPER))
}

/// One message handed to a `RecordingMailer`
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: Value,
}

/// Mailer that keeps every message in memory, optionally failing each send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: Value,
    ) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            template: template.to_string(),
            context,
        });

        if self.fail {
            return Err(MailError {
                to: to.to_string(),
                subject: subject.to_string(),
                message: "transport unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Migrated in-memory AppData with default roles seeded
pub async fn setup_test_app_data(
    admin_email: Option<&str>,
    mailer: Arc<dyn Mailer>,
) -> Arc<AppData> {
    let db = setup_test_db().await;
    let settings = BootstrapSettings::new("sqlite::memory:", admin_email.map(str::to_string));
    let app_data = AppData::from_connection(db, settings, test_secret_manager(), mailer);

    app_data
        .permission_provider
        .seed_default_roles(&app_data.db)
        .await
        .expect("Failed to seed roles");

    Arc::new(app_data)
}
