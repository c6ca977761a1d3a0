use std::fmt;
use std::sync::Arc;

use crate::config::errors::ConfigError;
use crate::config::{EnvironmentProvider, SystemEnvironment};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://identity.db?mode=rwc";
pub const DEFAULT_TOKEN_MAX_AGE_SECONDS: u64 = 3600;

/// Non-secret settings read once at process start
#[derive(Clone)]
pub struct BootstrapSettings {
    database_url: String,
    admin_email: Option<String>,
    token_max_age_seconds: u64,
}

impl BootstrapSettings {
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        let database_url = env_provider
            .get_var("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let admin_email = env_provider
            .get_var("ADMIN_EMAIL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let token_max_age_seconds = match env_provider.get_var("TOKEN_MAX_AGE_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidFormat {
                setting_name: "TOKEN_MAX_AGE_SECONDS".to_string(),
                expected: "non-negative integer (seconds)".to_string(),
                actual: raw.clone(),
            })?,
            None => DEFAULT_TOKEN_MAX_AGE_SECONDS,
        };

        Ok(Self {
            database_url,
            admin_email,
            token_max_age_seconds,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    /// Build directly from known values (tests, embedding)
    pub fn new(database_url: impl Into<String>, admin_email: Option<String>) -> Self {
        Self {
            database_url: database_url.into(),
            admin_email,
            token_max_age_seconds: DEFAULT_TOKEN_MAX_AGE_SECONDS,
        }
    }

    pub fn with_token_max_age(mut self, seconds: u64) -> Self {
        self.token_max_age_seconds = seconds;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Address that receives new-user notifications and is granted the
    /// Administrator role on creation
    pub fn admin_email(&self) -> Option<&str> {
        self.admin_email.as_deref()
    }

    pub fn token_max_age_seconds(&self) -> u64 {
        self.token_max_age_seconds
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("admin_email", &self.admin_email)
            .field("token_max_age_seconds", &self.token_max_age_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    fn load(env: MockEnvironment) -> Result<BootstrapSettings, ConfigError> {
        BootstrapSettings::from_env_provider(Arc::new(env))
    }

    #[test]
    fn test_bootstrap_settings_with_defaults() {
        let settings = load(MockEnvironment::empty()).unwrap();

        assert_eq!(settings.database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(settings.admin_email(), None);
        assert_eq!(settings.token_max_age_seconds(), 3600);
    }

    #[test]
    fn test_bootstrap_settings_with_all_vars() {
        let settings = load(MockEnvironment::empty().with_vars(&[
            ("DATABASE_URL", "sqlite://test.db"),
            ("ADMIN_EMAIL", " admin@example.com "),
            ("TOKEN_MAX_AGE_SECONDS", "600"),
        ]))
        .unwrap();

        assert_eq!(settings.database_url(), "sqlite://test.db");
        assert_eq!(settings.admin_email(), Some("admin@example.com"));
        assert_eq!(settings.token_max_age_seconds(), 600);
    }

    #[test]
    fn test_empty_admin_email_is_absent() {
        let settings = load(MockEnvironment::empty().with_var("ADMIN_EMAIL", "")).unwrap();
        assert_eq!(settings.admin_email(), None);
    }

    #[test]
    fn test_invalid_max_age() {
        let err = load(MockEnvironment::empty().with_var("TOKEN_MAX_AGE_SECONDS", "an hour")).unwrap_err();

        match err {
            ConfigError::InvalidFormat { setting_name, actual, .. } => {
                assert_eq!(setting_name, "TOKEN_MAX_AGE_SECONDS");
                assert_eq!(actual, "an hour");
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }
}
