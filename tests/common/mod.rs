// Common test utilities for integration tests
//
// `MapEnvironment` and `RecordingMailer` mirror the crate's unit-test
// helpers (`MockEnvironment`, `src/test/utils.rs`), which are
// `#[cfg(test)]` and so not visible from integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use identity_core::AppData;
use identity_core::config::{BootstrapSettings, EnvironmentProvider, SecretManager};
use identity_core::providers::{MailError, Mailer};
use migration::{IdentityMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Creates a test database with migrations applied
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
    Arc::new(SecretManager::from_values(
        "integration-secret-key-32-chars!",
        "integration-pepper-16",
    ))
}

/// Builds AppData over a migrated in-memory database, roles seeded
pub async fn setup_app_data(admin_email: Option<&str>, mailer: Arc<dyn Mailer>) -> Arc<AppData> {
    let settings = BootstrapSettings::new("sqlite::memory:", admin_email.map(str::to_string));
    setup_app_data_with(settings, mailer).await
}

pub async fn setup_app_data_with(settings: BootstrapSettings, mailer: Arc<dyn Mailer>) -> Arc<AppData> {
    let db = setup_test_db().await;
    let app_data = AppData::from_connection(db, settings, test_secret_manager(), mailer);

    app_data
        .permission_provider
        .seed_default_roles(&app_data.db)
        .await
        .expect("Failed to seed default roles");

    Arc::new(app_data)
}

/// Environment backed by a map, so tests never touch process variables
#[derive(Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvironmentProvider for MapEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: Value,
}

/// Mailer that records every message; `failing()` rejects each send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
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
                message: "smtp unavailable".to_string(),
            });
        }
        Ok(())
    }
}
